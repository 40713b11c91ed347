//! Cache file lifecycle.
//!
//! Everything lands in the cache through a sibling `.tmp` file that is renamed
//! onto the final path, so a partially written artifact is never visible under
//! its cache key. Temp names are unique per writer; two processes racing on
//! the same artifact each rename their own file and the last rename wins.
//!
//! Temp files are removed when their [`TempFile`] is dropped. Hosts should
//! also call [`sweep_pending`] on the way out so that nothing is left behind
//! when the process exits without unwinding.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{DepotError, Result};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".tmp";

static PENDING: Mutex<BTreeSet<PathBuf>> = Mutex::new(BTreeSet::new());
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path for `final_path`: `demo-1.0.jar` → `demo-1.0.jar.<pid>-<n>.tmp`.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut o = final_path.as_os_str().to_owned();
    o.push(format!(".{}-{}{}", std::process::id(), n, TEMP_SUFFIX));
    PathBuf::from(o)
}

/// Creates the parent directory of `path` if needed.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DepotError::io(format!("create {}", parent.display()), e))?;
    }
    Ok(())
}

/// A registered temp file next to its eventual destination.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    persisted: bool,
}

impl TempFile {
    /// Reserves a temp path beside `final_path`. Nothing is created on disk.
    pub fn beside(final_path: &Path) -> Self {
        let path = temp_path(final_path);
        lock_pending().insert(path.clone());
        Self {
            path,
            persisted: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        fs::write(&self.path, bytes)
            .map_err(|e| DepotError::io(format!("write {}", self.path.display()), e))
    }

    /// Atomically renames the temp file onto `final_path`.
    pub fn persist(mut self, final_path: &Path) -> Result<()> {
        fs::rename(&self.path, final_path).map_err(|e| {
            DepotError::io(
                format!(
                    "failed to rename {} to {}",
                    self.path.display(),
                    final_path.display()
                ),
                e,
            )
        })?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
        lock_pending().remove(&self.path);
    }
}

/// Writes `bytes` to `final_path` through a temp file and a rename.
pub fn write_atomic(final_path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(final_path)?;
    let tmp = TempFile::beside(final_path);
    tmp.write(bytes)?;
    tmp.persist(final_path)
}

/// Deletes every temp file that is still registered. Returns how many were removed.
pub fn sweep_pending() -> usize {
    sweep(|_| true)
}

/// Like [`sweep_pending`], limited to temp files under `root`.
pub fn sweep_pending_under(root: &Path) -> usize {
    sweep(|p| p.starts_with(root))
}

fn sweep(select: impl Fn(&Path) -> bool) -> usize {
    let paths: Vec<PathBuf> = {
        let mut pending = lock_pending();
        let chosen: Vec<PathBuf> = pending
            .iter()
            .filter(|p| select(p.as_path()))
            .cloned()
            .collect();
        for p in &chosen {
            pending.remove(p);
        }
        chosen
    };
    let mut removed = 0;
    for path in paths {
        if fs::remove_file(&path).is_ok() {
            tracing::debug!("removed leftover temp file {}", path.display());
            removed += 1;
        }
    }
    removed
}

fn lock_pending() -> std::sync::MutexGuard<'static, BTreeSet<PathBuf>> {
    PENDING.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
