mod add;
pub mod args;
mod import;
mod log;
mod remove;
mod report;
mod save;
mod tree;
mod update;


pub use args::WbsCommands;

use crossterm::style::Stylize;
use tracing::debug;

use crate::shared::activity::{ActivityLog, TaskChange, change_counts, diff_forests};
use crate::shared::error::Result;
use crate::shared::file_config::FileConfig;
use crate::shared::store::{FileStore, ProjectStore};
use crate::shared::tasks::Forest;

/// Everything a command needs: where projects live, where activity goes,
/// and the loaded configuration.
pub struct Context<'a, S: ProjectStore> {
    pub store: S,
    pub activity: ActivityLog,
    pub config: &'a FileConfig,
}

impl<'a> Context<'a, FileStore> {
    pub fn from_config(config: &'a FileConfig) -> Self {
        Self {
            store: FileStore::new(&config.storage.data_dir),
            activity: ActivityLog::new(config.storage.activity_log_path()),
            config,
        }
    }
}

impl<S: ProjectStore> Context<'_, S> {
    /// Run a tree mutation through the store and audit it when a user is
    /// given. Returns the mutation's value and the recorded changes.
    pub fn mutate<T, F>(
        &self,
        project: &str,
        user: Option<&str>,
        f: F,
    ) -> Result<(T, Vec<TaskChange>)>
    where
        F: FnOnce(&mut Forest) -> Result<T>,
    {
        let (out, changes) = self.store.update(project, |forest| {
            let before = user.map(|_| forest.clone());
            let out = f(forest)?;
            let changes = before
                .map(|before| diff_forests(&before, forest))
                .unwrap_or_default();
            Ok((out, changes))
        })?;

        if !changes.is_empty() {
            debug!(project, changes = changes.len(), "recording task changes");
            self.activity.record_all(
                changes
                    .iter()
                    .cloned()
                    .map(|c| c.into_entry(user, Some(project))),
            )?;
        }
        Ok((out, changes))
    }
}

pub fn execute(command: WbsCommands, file_config: &FileConfig) -> Result<()> {
    let ctx = Context::from_config(file_config);
    run(command, &ctx)
}

pub fn run<S: ProjectStore>(command: WbsCommands, ctx: &Context<'_, S>) -> Result<()> {
    match command {
        WbsCommands::Import(args) => import::execute(args, ctx),
        WbsCommands::Save(args) => save::execute(args, ctx),
        WbsCommands::Update(args) => update::execute(args, ctx),
        WbsCommands::Add(args) => add::execute(args, ctx),
        WbsCommands::Remove(args) => remove::execute(args, ctx),
        WbsCommands::Report(args) => report::execute(args, ctx),
        WbsCommands::Tree(args) => tree::execute(args, ctx),
        WbsCommands::Log(args) => log::execute(args, ctx),
    }
}

/// One-line summary of audited changes, e.g. "2 created, 1 modified".
fn print_changes(changes: &[TaskChange]) {
    if changes.is_empty() {
        return;
    }
    let counts = change_counts(changes);
    let parts: Vec<String> = ["created", "modified", "deleted"]
        .iter()
        .filter_map(|verb| counts.get(verb).map(|n| format!("{n} {verb}")))
        .collect();
    println!("  {} {}", "Changes:".dark_grey(), parts.join(", "));
}
