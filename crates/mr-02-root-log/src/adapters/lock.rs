//! # Output Directory Locking
//!
//! Prevents two runs from appending to the same root logs.
//!
//! Two writers on one directory would interleave entries and break the
//! ordinal-to-offset mapping of every log they share.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

/// Errors from output directory locking
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created
    #[error("failed to create lock file {path}: {source}")]
    CreateFailed {
        /// Lock file path
        path: PathBuf,
        /// OS error
        #[source]
        source: io::Error,
    },

    /// Directory is already locked by another run
    #[error("output directory already in use{} ({})", pid_suffix(.pid), .path.display())]
    AlreadyLocked {
        /// PID recorded by the holder, if readable
        pid: Option<u32>,
        /// Lock file path
        path: PathBuf,
    },

    /// Failed to write PID to lock file
    #[error("failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

fn pid_suffix(pid: &Option<u32>) -> String {
    pid.map(|p| format!(" by process {}", p)).unwrap_or_default()
}

/// Exclusive lock on an output directory.
///
/// Acquired before any log is opened, released on drop.
///
/// # Example
///
/// ```ignore
/// let lock = OutputLock::acquire(Path::new("./roots"))?;
/// // Lock is held until `lock` goes out of scope
/// ```
#[derive(Debug)]
pub struct OutputLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl OutputLock {
    /// Lock file name
    pub const LOCK_FILE: &'static str = "LOCK";

    /// Acquire an exclusive lock on `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyLocked` if another run holds the lock.
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        let lock_path = dir.join(Self::LOCK_FILE);
        let create_failed = |source| LockError::CreateFailed {
            path: lock_path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(create_failed)?;

        // Not truncated yet: the holder's PID must stay readable.
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(create_failed)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{}", pid).map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;

        debug!(pid, path = %lock_path.display(), "Acquired output lock");

        Ok(Self {
            file,
            path: lock_path,
            pid,
        })
    }

    /// PID of the process holding the lock
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for OutputLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}
