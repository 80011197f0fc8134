use crossterm::style::Stylize;

use super::args::RemoveArgs;
use super::{Context, print_changes};
use crate::shared::error::{Result, WbsError};
use crate::shared::store::ProjectStore;
use crate::shared::tasks::tree_ops;

pub fn execute<S: ProjectStore>(args: RemoveArgs, ctx: &Context<'_, S>) -> Result<()> {
    let (removed, changes) = ctx.mutate(&args.project, args.user.as_deref(), |forest| {
        let removed = tree_ops::remove_task(forest, &args.id)
            .ok_or_else(|| WbsError::TaskNotFound(args.id.clone()))?;
        Ok(tree_ops::flatten(std::slice::from_ref(&removed)).len())
    })?;

    println!(
        "{} Removed {} ({} task(s))",
        "✓".green().bold(),
        args.id.as_str().cyan().bold(),
        removed
    );
    print_changes(&changes);
    Ok(())
}
