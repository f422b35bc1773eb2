//! File access for the executor and the assembler: reads, the single terminal
//! write, backups and the per-file lock registry.
//!
//! Locks only serialize batches inside one process. Separate processes editing
//! the same file must coordinate through their own external locking.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use chrono::Utc;
use tracing::debug;

use crate::core::{EditError, Result};

type LockRegistry = Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>;

static LOCKS: OnceLock<LockRegistry> = OnceLock::new();

/// The mutex guarding every batch that targets `path`.
///
/// Keys are canonical paths, so `./a.txt` and `/abs/a.txt` share one lock.
/// Files that do not exist yet are keyed by their absolute path. The registry
/// only holds weak references, and entries whose lock nobody holds any more
/// are dropped on the next lookup.
pub fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = lock_key(path);
    let mut registry = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(lock) = registry.get(&key).and_then(Weak::upgrade) {
        return lock;
    }

    registry.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    registry.insert(key, Arc::downgrade(&lock));
    lock
}

fn lock_key(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| EditError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| EditError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` to `path`, creating missing parent directories first
pub fn write_creating_dirs(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| EditError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    write(path, content)
}

/// `{path}.backup.{millis}`
pub fn backup_path(path: &Path, millis: i64) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".backup.{}", millis));
    PathBuf::from(name)
}

/// Snapshot `content` next to `path` and return where it went.
///
/// The backup is created with create-new semantics; when another backup of
/// the same millisecond already exists a `.1`, `.2`, ... suffix is added.
pub fn write_backup(path: &Path, content: &str) -> Result<PathBuf> {
    let base = backup_path(path, Utc::now().timestamp_millis());
    let mut attempt = 0usize;

    loop {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            let mut name = base.clone().into_os_string();
            name.push(format!(".{}", attempt));
            PathBuf::from(name)
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => {
                fill_backup(file, &candidate, content)?;
                debug!("Wrote backup {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => {
                return Err(EditError::Backup {
                    path: candidate,
                    source,
                })
            }
        }
    }
}

/// Write a freshly created backup, deleting it again if the write fails so no
/// truncated snapshot is left behind
fn fill_backup(mut file: impl Write, candidate: &Path, content: &str) -> Result<()> {
    let Err(source) = file.write_all(content.as_bytes()) else {
        return Ok(());
    };

    drop(file);
    if let Err(e) = fs::remove_file(candidate) {
        debug!("Could not remove partial backup {}: {}", candidate.display(), e);
    }

    Err(EditError::Backup {
        path: candidate.to_path_buf(),
        source,
    })
}
