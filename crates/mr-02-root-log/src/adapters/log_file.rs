//! # Root Log File
//!
//! Append-only file of 32-byte Merkle roots for one pool.
//!
//! ## Format
//!
//! ```text
//! offset 0        32       64       96
//!        [root 0 ][root 1 ][root 2 ]...
//! ```
//!
//! No header, footer or checkpoint metadata: the file size is the only
//! record of progress.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use shared_types::{BundleId, Hash, PoolId, HASH_SIZE};
use tracing::{debug, warn};

use crate::domain::errors::RootLogError;
use crate::domain::naming::log_path;

const ENTRY_SIZE: u64 = HASH_SIZE as u64;

/// Open handle on a pool's root log, positioned for appending.
///
/// Exactly one `RootLog` per pool should exist during a run; the pipeline's
/// writer owns it.
#[derive(Debug)]
pub struct RootLog {
    pool_id: PoolId,
    path: PathBuf,
    file: File,
    height: u64,
}

impl RootLog {
    /// Open (creating if absent) the log of `pool_id` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `RootLogError::Corrupted` if the existing file is not a whole
    /// number of entries.
    pub fn open(dir: &Path, pool_id: PoolId) -> Result<Self, RootLogError> {
        std::fs::create_dir_all(dir).map_err(|e| RootLogError::io(dir, e))?;

        let path = log_path(dir, pool_id);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .map_err(|e| RootLogError::io(&path, e))?;

        let size = file
            .metadata()
            .map_err(|e| RootLogError::io(&path, e))?
            .len();
        let height = height_from_size(&path, size)?;

        debug!(pool_id, height, path = %path.display(), "Opened root log");

        Ok(Self {
            pool_id,
            path,
            file,
            height,
        })
    }

    /// Pool this log belongs to.
    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries, i.e. the next ordinal to be appended.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Append one root and make it durable.
    ///
    /// Returns the new height. On failure the file is cut back to its
    /// previous length so that its size stays a multiple of 32.
    pub fn append(&mut self, root: &Hash) -> Result<u64, RootLogError> {
        let previous_len = self.height * ENTRY_SIZE;

        let written = self
            .file
            .write_all(root)
            .and_then(|()| self.file.sync_data());

        if let Err(e) = written {
            warn!(
                pool_id = self.pool_id,
                height = self.height,
                error = %e,
                "Append failed, restoring previous log length"
            );
            if let Err(restore) = self.file.set_len(previous_len) {
                warn!(pool_id = self.pool_id, error = %restore, "Could not restore log length");
            }
            return Err(RootLogError::io(&self.path, e));
        }

        self.height += 1;
        Ok(self.height)
    }

    /// Read the root stored for `ordinal`.
    pub fn read_root(&mut self, ordinal: BundleId) -> Result<Hash, RootLogError> {
        if ordinal >= self.height {
            return Err(RootLogError::OutOfRange {
                path: self.path.clone(),
                ordinal,
                height: self.height,
            });
        }

        let mut root = [0u8; HASH_SIZE];
        self.file
            .seek(SeekFrom::Start(ordinal * ENTRY_SIZE))
            .and_then(|_| self.file.read_exact(&mut root))
            .map_err(|e| RootLogError::io(&self.path, e))?;
        Ok(root)
    }

    /// Read every root of the log at `dir` for `pool_id`, in ordinal order.
    ///
    /// A missing file yields an empty list.
    pub fn read_all(dir: &Path, pool_id: PoolId) -> Result<Vec<Hash>, RootLogError> {
        let path = log_path(dir, pool_id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RootLogError::io(&path, e)),
        };
        height_from_size(&path, bytes.len() as u64)?;

        Ok(bytes
            .chunks_exact(HASH_SIZE)
            .map(|chunk| {
                let mut root = [0u8; HASH_SIZE];
                root.copy_from_slice(chunk);
                root
            })
            .collect())
    }
}

/// Convert a file size into an entry count, rejecting partial entries.
pub(crate) fn height_from_size(path: &Path, size: u64) -> Result<u64, RootLogError> {
    if size % ENTRY_SIZE != 0 {
        return Err(RootLogError::Corrupted {
            path: path.to_path_buf(),
            size,
        });
    }
    Ok(size / ENTRY_SIZE)
}
