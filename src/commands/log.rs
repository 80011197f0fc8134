use crossterm::style::Stylize;

use super::Context;
use super::args::LogArgs;
use crate::shared::activity::ActivityEntry;
use crate::shared::error::Result;
use crate::shared::store::ProjectStore;

pub(super) fn select(entries: Vec<ActivityEntry>, args: &LogArgs) -> Vec<ActivityEntry> {
    entries
        .into_iter()
        .filter(|e| {
            args.project
                .as_deref()
                .is_none_or(|p| e.project.as_deref() == Some(p))
        })
        .take(args.limit.unwrap_or(usize::MAX))
        .collect()
}

pub fn execute<S: ProjectStore>(args: LogArgs, ctx: &Context<'_, S>) -> Result<()> {
    let entries = select(ctx.activity.entries()?, &args);
    if entries.is_empty() {
        println!("{}", "No activity recorded.".dark_grey());
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}  {}  {}",
            entry.timestamp.as_str().dark_grey(),
            entry.action.as_str().cyan().bold(),
            entry.project.as_deref().unwrap_or("-").yellow(),
            entry.user.as_deref().unwrap_or("-").dark_grey(),
        );
        println!("    {}", entry.details);
    }
    Ok(())
}
