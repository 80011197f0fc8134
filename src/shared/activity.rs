//! Audit trail of project changes.
//!
//! The log is a single JSON array, newest entry first. A tree replacement
//! is audited by diffing the stored forest against the incoming one.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::shared::error::Result;
use crate::shared::store::{ProjectLock, unique_sibling};
use crate::shared::tasks::{TaskNode, tree_ops, wbs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub user: Option<String>,
    pub project: Option<String>,
    pub action: String,
    pub details: String,
}

impl ActivityEntry {
    pub fn new(
        user: Option<&str>,
        project: Option<&str>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            user: user.map(str::to_string),
            project: project.map(str::to_string),
            action: action.into(),
            details: details.into(),
        }
    }
}

/// How long a writer waits for another writer to finish with the log.
const LOCK_WAIT: Duration = Duration::from_secs(10);

/// File-backed activity log. Writers are serialized through a lock file
/// next to the log.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// All entries, newest first. A missing log is empty; an unreadable one
    /// is reported as empty and will be replaced on the next write.
    pub fn entries(&self) -> Result<Vec<ActivityEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "activity log is empty or corrupt");
                Ok(Vec::new())
            }
        }
    }

    pub fn record(&self, entry: ActivityEntry) -> Result<()> {
        self.record_all(std::iter::once(entry))
    }

    /// Prepend entries in the order given, so the last one ends up on top.
    pub fn record_all(&self, entries: impl IntoIterator<Item = ActivityEntry>) -> Result<()> {
        let entries: Vec<ActivityEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let _lock = ProjectLock::wait(&self.lock_path(), LOCK_WAIT)?;

        let mut log = self.entries()?;
        let added = entries.len();
        for entry in entries {
            log.insert(0, entry);
        }

        let content = serde_json::to_string_pretty(&log)?;
        let tmp_path = unique_sibling(&self.path, "tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), added, "activity recorded");
        Ok(())
    }
}

// ── Forest diff ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Edited,
}

impl ChangeKind {
    pub fn action(self) -> &'static str {
        match self {
            ChangeKind::Added => "Task Added",
            ChangeKind::Deleted => "Task Deleted",
            ChangeKind::Edited => "Task Edited",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ChangeKind::Added => "created",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Edited => "modified",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskChange {
    pub kind: ChangeKind,
    pub id: String,
    pub wbs: String,
    pub task_name: String,
}

impl TaskChange {
    fn from_node(kind: ChangeKind, node: &TaskNode) -> Self {
        Self {
            kind,
            id: node.id.clone(),
            wbs: node.wbs.clone(),
            task_name: node.task_name.clone().unwrap_or_default(),
        }
    }

    pub fn details(&self) -> String {
        format!(
            "Task '{}' (WBS: {}) was {}.",
            self.task_name,
            self.wbs,
            self.kind.verb()
        )
    }

    pub fn into_entry(self, user: Option<&str>, project: Option<&str>) -> ActivityEntry {
        ActivityEntry::new(user, project, self.kind.action(), self.details())
    }
}

/// Classify every task id as added, deleted or edited between two forests.
///
/// Nodes are compared deeply, so a parent whose subtree changed is edited
/// too. Changes come back in WBS order.
pub fn diff_forests(old: &[TaskNode], new: &[TaskNode]) -> Vec<TaskChange> {
    let old_index = tree_ops::index_by_id(old);
    let new_index = tree_ops::index_by_id(new);

    let mut changes: Vec<TaskChange> = new_index
        .iter()
        .filter_map(|(id, node)| match old_index.get(id) {
            None => Some(TaskChange::from_node(ChangeKind::Added, node)),
            Some(before) if before != node => Some(TaskChange::from_node(ChangeKind::Edited, node)),
            Some(_) => None,
        })
        .collect();
    changes.extend(
        old_index
            .iter()
            .filter(|(id, _)| !new_index.contains_key(*id))
            .map(|(_, node)| TaskChange::from_node(ChangeKind::Deleted, node)),
    );

    changes.sort_by(|a, b| wbs::compare(&a.wbs, &b.wbs).then_with(|| a.id.cmp(&b.id)));
    changes
}

/// Summary counts per change kind, for terminal output.
pub fn change_counts(changes: &[TaskChange]) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for change in changes {
        *counts.entry(change.kind.verb()).or_insert(0) += 1;
    }
    counts
}
