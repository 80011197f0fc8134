use crossterm::style::Stylize;

use super::args::AddArgs;
use super::update::{date_arg, weightage_arg};
use super::{Context, print_changes};
use crate::shared::error::{Result, WbsError};
use crate::shared::store::ProjectStore;
use crate::shared::tasks::{TaskNode, WbsCode, tree_ops};

fn node_from_args(args: &AddArgs) -> Result<TaskNode> {
    let code = WbsCode::parse(&args.wbs)
        .ok_or_else(|| WbsError::InvalidEdit(format!("'{}' is not a WBS code", args.wbs)))?;

    let mut node = TaskNode::new(code.to_string());
    node.task_name = args.name.clone();
    node.planned_start_date = args
        .planned_start
        .as_deref()
        .map(|d| date_arg("planned start", d))
        .transpose()?;
    node.planned_end_date = args
        .planned_end
        .as_deref()
        .map(|d| date_arg("planned end", d))
        .transpose()?;
    if let Some(weightage) = args.weightage {
        node.weightage = weightage_arg(weightage)?;
    }
    node.is_critical = args.critical;
    Ok(node)
}

pub fn execute<S: ProjectStore>(args: AddArgs, ctx: &Context<'_, S>) -> Result<()> {
    let node = node_from_args(&args)?;
    let id = node.id.clone();

    let (parent, changes) = ctx.mutate(&args.project, args.user.as_deref(), |forest| {
        tree_ops::insert_by_wbs(forest, node)?;
        Ok(tree_ops::parent_of(forest, &id).map(|p| p.id.clone()))
    })?;

    match parent {
        Some(parent) => println!(
            "{} Added {} under {}",
            "✓".green().bold(),
            id.as_str().cyan().bold(),
            parent.as_str().cyan()
        ),
        None => println!(
            "{} Added {} at top level",
            "✓".green().bold(),
            id.as_str().cyan().bold()
        ),
    }
    print_changes(&changes);
    Ok(())
}
