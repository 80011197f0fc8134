mod lock;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::shared::aggregate::recalculate_progress;
use crate::shared::error::{Result, WbsError};
use crate::shared::tasks::{Forest, TaskNode, forest_from_json, forest_to_json};

pub use lock::ProjectLock;
pub(crate) use lock::unique_sibling;

/// Keyed persistence of project forests.
///
/// `update` is the only mutation path that guarantees exclusion between
/// writers and that parent progress is refreshed before the tree is stored.
pub trait ProjectStore {
    /// Load a project. An unknown project is an empty forest.
    fn load(&self, project: &str) -> Result<Forest>;

    /// Replace a project's forest as given.
    fn save(&self, project: &str, forest: &[TaskNode]) -> Result<()>;

    /// Load, mutate, recalculate and save under the project's write lock.
    /// Nothing is written if `f` fails.
    fn update<T, F>(&self, project: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Forest) -> Result<T>;
}

/// Map a project name onto its document file name.
///
/// Keeps ASCII alphanumerics, spaces and underscores, trims trailing
/// spaces, turns the remaining spaces into underscores and appends
/// `_data.json`.
pub fn project_file_name(project: &str) -> Result<String> {
    let kept: String = project
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    let stem = kept.trim_end().replace(' ', "_");
    if stem.is_empty() {
        return Err(WbsError::InvalidProject(project.to_string()));
    }
    Ok(format!("{stem}_data.json"))
}

// ── File store ──────────────────────────────────────────────────────

/// One JSON document per project inside `data_dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn document_path(&self, project: &str) -> Result<PathBuf> {
        Ok(self.data_dir.join(project_file_name(project)?))
    }

    fn lock_path(document: &Path) -> PathBuf {
        document.with_extension("json.lock")
    }

    fn read_document(path: &Path) -> Result<Forest> {
        if !path.exists() {
            debug!(path = %path.display(), "no project document yet");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        forest_from_json(&content)
    }

    fn write_document(path: &Path, forest: &[TaskNode]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = forest_to_json(forest)?;
        let tmp_path = unique_sibling(path, "tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl ProjectStore for FileStore {
    fn load(&self, project: &str) -> Result<Forest> {
        Self::read_document(&self.document_path(project)?)
    }

    fn save(&self, project: &str, forest: &[TaskNode]) -> Result<()> {
        let path = self.document_path(project)?;
        Self::write_document(&path, forest)?;
        info!(project, path = %path.display(), roots = forest.len(), "saved project");
        Ok(())
    }

    fn update<T, F>(&self, project: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Forest) -> Result<T>,
    {
        let path = self.document_path(project)?;
        std::fs::create_dir_all(&self.data_dir)?;
        let _lock = ProjectLock::acquire(&Self::lock_path(&path))?;

        let mut forest = Self::read_document(&path)?;
        let out = f(&mut forest)?;
        recalculate_progress(&mut forest);
        Self::write_document(&path, &forest)?;
        info!(project, path = %path.display(), roots = forest.len(), "updated project");
        Ok(out)
    }
}

// ── Memory store ────────────────────────────────────────────────────

/// In-process store keyed by sanitized project name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<String, Forest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, project: &str) -> Result<Forest> {
        let key = project_file_name(project)?;
        let projects = self.projects.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(projects.get(&key).cloned().unwrap_or_default())
    }

    fn save(&self, project: &str, forest: &[TaskNode]) -> Result<()> {
        let key = project_file_name(project)?;
        let mut projects = self.projects.lock().unwrap_or_else(PoisonError::into_inner);
        projects.insert(key, forest.to_vec());
        Ok(())
    }

    fn update<T, F>(&self, project: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Forest) -> Result<T>,
    {
        let key = project_file_name(project)?;
        let mut projects = self.projects.lock().unwrap_or_else(PoisonError::into_inner);
        let mut forest = projects.get(&key).cloned().unwrap_or_default();
        let out = f(&mut forest)?;
        recalculate_progress(&mut forest);
        projects.insert(key, forest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::tasks::tree_ops;

    fn sample() -> Forest {
        let mut root = TaskNode::new("1");
        let mut a = TaskNode::new("1.1");
        a.weightage = 1.0;
        a.progress = 40;
        root.subtasks.push(a);
        vec![root]
    }

    #[test]
    fn test_project_file_name() {
        assert_eq!(project_file_name("Tower A").unwrap(), "Tower_A_data.json");
        assert_eq!(project_file_name("site/../x ").unwrap(), "sitex_data.json");
        assert_eq!(project_file_name("a_b  c").unwrap(), "a_b__c_data.json");
        assert!(matches!(
            project_file_name("../"),
            Err(WbsError::InvalidProject(_))
        ));
        assert!(project_file_name("   ").is_err());
    }

    #[test]
    fn test_file_store_missing_project_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("nothing").unwrap().is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        store.save("Tower A", &sample()).unwrap();

        assert!(dir.path().join("data/Tower_A_data.json").exists());
        // only the document remains
        assert_eq!(std::fs::read_dir(dir.path().join("data")).unwrap().count(), 1);
        let loaded = store.load("Tower A").unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_file_store_update_recalculates_and_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("p", &sample()).unwrap();

        let wbs = store
            .update("p", |forest| {
                let node = tree_ops::find_node_mut(forest, "1.1")
                    .ok_or_else(|| WbsError::TaskNotFound("1.1".into()))?;
                node.progress = 90;
                Ok(node.wbs.clone())
            })
            .unwrap();

        assert_eq!(wbs, "1.1");
        let loaded = store.load("p").unwrap();
        assert_eq!(loaded[0].progress, 90);
        assert!(!dir.path().join("p_data.json.lock").exists());
    }

    #[test]
    fn test_file_store_failed_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("p", &sample()).unwrap();

        let err = store
            .update("p", |forest| -> Result<()> {
                forest.clear();
                Err(WbsError::InvalidEdit("nope".into()))
            })
            .unwrap_err();

        assert!(matches!(err, WbsError::InvalidEdit(_)));
        assert_eq!(store.load("p").unwrap(), sample());
        assert!(!dir.path().join("p_data.json.lock").exists());
    }

    #[test]
    fn test_file_store_update_blocked_by_live_lock() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let doc = store.document_path("p").unwrap();
        let _held = ProjectLock::acquire(&FileStore::lock_path(&doc)).unwrap();

        let err = store.update("p", |_| Ok(())).unwrap_err();
        assert!(matches!(err, WbsError::ProjectLocked(_)));
    }

    #[test]
    fn test_concurrent_updates_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("p", &sample()).unwrap();
        let applied = std::sync::atomic::AtomicUsize::new(0);

        std::thread::scope(|s| {
            for writer in 0..6 {
                let (store, applied) = (&store, &applied);
                s.spawn(move || {
                    for i in 0..40 {
                        let result = store.update("p", |forest| {
                            forest[0].notes.push(crate::shared::tasks::Note {
                                text: Some(format!("{writer}-{i}")),
                                timestamp: None,
                                source: None,
                            });
                            Ok(())
                        });
                        match result {
                            Ok(()) => {
                                applied.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                            }
                            Err(WbsError::ProjectLocked(_)) => std::thread::yield_now(),
                            Err(e) => panic!("unexpected update error: {e}"),
                        }
                    }
                });
            }
        });

        let notes = store.load("p").unwrap()[0].notes.len();
        assert!(notes > 0);
        assert_eq!(notes, applied.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p_data.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.load("p"), Err(WbsError::JsonParse(_))));
    }

    #[test]
    fn test_memory_store_update() {
        let store = MemoryStore::new();
        assert!(store.load("p").unwrap().is_empty());
        store.save("p", &sample()).unwrap();

        store
            .update("p", |forest| {
                forest[0].subtasks[0].progress = 10;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.load("p").unwrap()[0].progress, 10);
        // sanitized names share one slot
        assert_eq!(store.load("p ").unwrap()[0].progress, 10);
    }
}
