use chrono::Utc;
use crossterm::style::Stylize;

use super::args::UpdateArgs;
use super::{Context, print_changes};
use crate::shared::dates::parse_date;
use crate::shared::error::{Result, WbsError};
use crate::shared::store::ProjectStore;
use crate::shared::tasks::{Note, TaskNode, TaskStatus, tree_ops};

/// Validate a date argument and return it in ISO form.
pub(super) fn date_arg(field: &str, raw: &str) -> Result<String> {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| WbsError::InvalidEdit(format!("{field}: '{raw}' is not a date")))
}

pub(super) fn weightage_arg(raw: f64) -> Result<f64> {
    if raw.is_finite() && raw >= 0.0 {
        Ok(raw)
    } else {
        Err(WbsError::InvalidEdit(format!(
            "weightage must be a non-negative number, got {raw}"
        )))
    }
}

/// Apply every field the user supplied. Nothing is changed if any field
/// is invalid.
fn apply(node: &mut TaskNode, args: &UpdateArgs) -> Result<()> {
    if args.progress.is_some() && !node.is_leaf() {
        return Err(WbsError::InvalidEdit(format!(
            "task {} has subtasks; its progress is derived",
            node.id
        )));
    }
    let planned_start = args
        .planned_start
        .as_deref()
        .map(|d| date_arg("planned start", d))
        .transpose()?;
    let planned_end = args
        .planned_end
        .as_deref()
        .map(|d| date_arg("planned end", d))
        .transpose()?;
    let actual_start = args
        .actual_start
        .as_deref()
        .map(|d| date_arg("actual start", d))
        .transpose()?;
    let actual_end = args
        .actual_end
        .as_deref()
        .map(|d| date_arg("actual end", d))
        .transpose()?;
    let weightage = args.weightage.map(weightage_arg).transpose()?;

    if let Some(progress) = args.progress {
        node.progress = progress;
    }
    if let Some(status) = &args.status {
        node.status = TaskStatus::from(status.as_str());
    }
    if planned_start.is_some() {
        node.planned_start_date = planned_start;
    }
    if planned_end.is_some() {
        node.planned_end_date = planned_end;
    }
    if actual_start.is_some() {
        node.actual_start_date = actual_start;
    }
    if actual_end.is_some() {
        node.actual_end_date = actual_end;
    }
    if args.clear_actual_end {
        node.actual_end_date = None;
    }
    if let Some(weightage) = weightage {
        node.weightage = weightage;
    }
    if let Some(critical) = args.critical {
        node.is_critical = critical;
    }
    if let Some(days) = args.delay_weather {
        node.delay_weather_days = days;
    }
    if let Some(days) = args.delay_contractor {
        node.delay_contractor_days = days;
    }
    if let Some(days) = args.delay_client {
        node.delay_client_days = days;
    }
    if let Some(text) = &args.note {
        node.notes.push(Note {
            text: Some(text.clone()),
            timestamp: Some(Utc::now().to_rfc3339()),
            source: None,
        });
    }
    Ok(())
}

pub fn execute<S: ProjectStore>(args: UpdateArgs, ctx: &Context<'_, S>) -> Result<()> {
    let (progress, changes) = ctx.mutate(&args.project, args.user.as_deref(), |forest| {
        let node = tree_ops::find_node_mut(forest, &args.id)
            .ok_or_else(|| WbsError::TaskNotFound(args.id.clone()))?;
        apply(node, &args)?;
        Ok(node.progress)
    })?;

    println!(
        "{} Updated {} ({}%)",
        "✓".green().bold(),
        args.id.as_str().cyan().bold(),
        progress
    );
    print_changes(&changes);
    Ok(())
}
