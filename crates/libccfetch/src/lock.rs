use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use fs4::FileExt;
use tracing::debug;

use crate::error::Result;

/// Exclusive advisory lock serializing fetches of one identifier across
/// processes sharing a download directory.
///
/// The lock file itself is left in place when released: unlinking it would
/// let a waiter and a newcomer lock two different inodes at once.
#[derive(Debug)]
pub struct CacheLock {
    /// Open handle holding the lock.
    file: File,
    /// Location of the lock file.
    path: PathBuf,
}

impl CacheLock {
    /// Block until the lock at `path` is held exclusively.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        debug!(lock = %path.display(), "acquired cache lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    #[allow(clippy::let_underscore_must_use)]
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
