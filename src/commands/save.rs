use crossterm::style::Stylize;

use super::args::SaveArgs;
use super::{Context, print_changes};
use crate::shared::error::{Result, WbsError};
use crate::shared::store::ProjectStore;
use crate::shared::tasks::forest_from_json;

pub fn execute<S: ProjectStore>(args: SaveArgs, ctx: &Context<'_, S>) -> Result<()> {
    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| WbsError::MissingFile(format!("{}: {}", args.input.display(), e)))?;
    let incoming = forest_from_json(&content)?;

    let ((), changes) = ctx.mutate(&args.project, args.user.as_deref(), |forest| {
        *forest = incoming;
        Ok(())
    })?;

    println!(
        "{} Saved {}",
        "✓".green().bold(),
        args.project.as_str().bold()
    );
    print_changes(&changes);
    Ok(())
}
