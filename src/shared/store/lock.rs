use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::shared::error::{Result, WbsError};

/// Seconds after which an unrefreshed lock is considered abandoned.
const STALE_AFTER_SECS: i64 = 10;

/// Attempts at taking over stale locks before giving up.
const TAKEOVER_ATTEMPTS: usize = 3;

/// Poll interval for [`ProjectLock::wait`].
const WAIT_POLL: Duration = Duration::from_millis(5);

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Sibling path unique to this process and call, e.g. `doc.json.1234-7.tmp`.
pub(crate) fn unique_sibling(path: &Path, suffix: &str) -> PathBuf {
    let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}-{}.{}", std::process::id(), token, suffix));
    path.with_file_name(name)
}

/// Exclusive write lock on one document (a project file or the activity
/// log).
///
/// The lock file is fully written under a private name and then published
/// with `hard_link`, which fails when the target exists, so no reader ever
/// sees a half-written lock. It is removed on drop only while it still
/// carries this holder's pid and token. A lock is stale when its heartbeat
/// is older than ten seconds or its PID is gone; an unreadable lock is
/// stale only once its mtime is that old.
#[derive(Debug)]
pub struct ProjectLock {
    pub pid: u32,
    pub heartbeat: DateTime<Utc>,
    token: u64,
    path: PathBuf,
}

/// On-disk contents of a lock file.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct LockData {
    pid: u32,
    heartbeat: DateTime<Utc>,
    #[serde(default)]
    token: u64,
}

impl ProjectLock {
    /// Acquire the lock, taking over a stale one. Fails with
    /// `ProjectLocked` while another live writer holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        for _ in 0..TAKEOVER_ATTEMPTS {
            match Self::publish(path) {
                Ok(lock) => return Ok(lock),
                Err(WbsError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }

            let observed = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !content_is_stale(&observed, path) {
                return Err(WbsError::ProjectLocked(format!(
                    "{}: {}",
                    path.display(),
                    observed.trim()
                )));
            }
            warn!(path = %path.display(), "taking over stale lock");
            take_over(path, &observed)?;
        }
        Err(WbsError::ProjectLocked(format!(
            "{}: contended stale lock",
            path.display()
        )))
    }

    /// Acquire, retrying while another writer holds the lock, for at most
    /// `timeout`.
    pub fn wait(path: &Path, timeout: Duration) -> Result<Self> {
        let deadline = SystemTime::now() + timeout;
        loop {
            match Self::acquire(path) {
                Err(WbsError::ProjectLocked(_)) if SystemTime::now() < deadline => {
                    std::thread::sleep(WAIT_POLL);
                }
                other => return other,
            }
        }
    }

    fn publish(path: &Path) -> Result<Self> {
        let data = LockData {
            pid: std::process::id(),
            heartbeat: Utc::now(),
            token: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
        };
        let staging = unique_sibling(path, "new");
        std::fs::write(&staging, serde_yaml::to_string(&data)?)?;
        let linked = std::fs::hard_link(&staging, path);
        std::fs::remove_file(&staging).ok();
        linked?;

        Ok(Self {
            pid: data.pid,
            heartbeat: data.heartbeat,
            token: data.token,
            path: path.to_path_buf(),
        })
    }

    /// Check if a lock file is stale (heartbeat too old or PID not alive).
    /// A missing lock counts as stale.
    pub fn is_stale(path: &Path) -> bool {
        match std::fs::read_to_string(path) {
            Ok(content) => content_is_stale(&content, path),
            Err(_) => true,
        }
    }

    fn owns(&self, content: &str) -> bool {
        serde_yaml::from_str::<LockData>(content)
            .is_ok_and(|data| data.pid == self.pid && data.token == self.token)
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return;
        };
        if !self.owns(&content) {
            warn!(path = %self.path.display(), "lock was taken over; leaving it in place");
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

fn content_is_stale(content: &str, path: &Path) -> bool {
    match serde_yaml::from_str::<LockData>(content) {
        Ok(data) => {
            let age = Utc::now() - data.heartbeat;
            age.num_seconds() > STALE_AFTER_SECS || !is_pid_alive(data.pid)
        }
        Err(_) => modified_secs_ago(path).is_none_or(|secs| secs > STALE_AFTER_SECS as u64),
    }
}

fn modified_secs_ago(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default()
            .as_secs(),
    )
}

/// Move a stale lock aside. If the file moved is no longer the one judged
/// stale, a fresh owner got there first and its lock is put back.
fn take_over(path: &Path, observed: &str) -> Result<()> {
    let tomb = unique_sibling(path, "stale");
    match std::fs::rename(path, &tomb) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    }
    let moved = std::fs::read_to_string(&tomb).unwrap_or_default();
    if moved != observed {
        std::fs::hard_link(&tomb, path).ok();
    }
    std::fs::remove_file(&tomb).ok();
    Ok(())
}

/// Check if a process with the given PID is alive.
fn is_pid_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        // kill(pid, 0) checks existence without sending a signal
        unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}
