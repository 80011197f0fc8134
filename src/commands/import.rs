use crossterm::style::Stylize;
use tracing::info;

use super::Context;
use super::args::ImportArgs;
use crate::shared::activity::ActivityEntry;
use crate::shared::error::Result;
use crate::shared::hierarchy::HierarchyBuilder;
use crate::shared::import::read_rows_from_path;
use crate::shared::store::ProjectStore;
use crate::shared::tasks::tree_ops;

pub fn execute<S: ProjectStore>(args: ImportArgs, ctx: &Context<'_, S>) -> Result<()> {
    let rows = read_rows_from_path(&args.csv)?;
    let builder = HierarchyBuilder::new()
        .with_columns(ctx.config.import.columns.clone())
        .with_date_formats(ctx.config.import.date_formats.clone());
    let forest = builder.build(&rows);
    let task_count = tree_ops::flatten(&forest).len();
    info!(
        project = %args.project,
        rows = rows.len(),
        tasks = task_count,
        "imported schedule"
    );

    ctx.store.update(&args.project, |stored| {
        *stored = forest;
        Ok(())
    })?;

    let file_name = args
        .csv
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.csv.display().to_string());
    ctx.activity.record(ActivityEntry::new(
        args.user.as_deref(),
        Some(&args.project),
        "CSV Upload",
        format!("{} rows imported from '{}'.", rows.len(), file_name),
    ))?;

    println!(
        "{} Imported {} rows into {} ({} tasks)",
        "✓".green().bold(),
        rows.len(),
        args.project.as_str().bold(),
        task_count
    );
    Ok(())
}
