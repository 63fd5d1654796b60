//! # Domain Errors
//!
//! Error types for the root log.
//!
//! ## Design Principles
//!
//! - Every variant carries the path it concerns
//! - Corruption is a distinct variant, never folded into I/O errors

use std::io;
use std::path::PathBuf;

use shared_types::{BundleId, HASH_SIZE};
use thiserror::Error;

/// Errors that can occur while reading or appending a root log.
#[derive(Debug, Error)]
pub enum RootLogError {
    /// Underlying filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// OS error
        #[source]
        source: io::Error,
    },

    /// File size is not a whole number of entries.
    #[error(
        "root log {path} is corrupted: size {size} is not a multiple of {}",
        HASH_SIZE
    )]
    Corrupted {
        /// Offending file
        path: PathBuf,
        /// Observed size in bytes
        size: u64,
    },

    /// Requested ordinal lies beyond the end of the log.
    #[error("ordinal {ordinal} is beyond the end of {path} (height {height})")]
    OutOfRange {
        /// Log file
        path: PathBuf,
        /// Requested ordinal
        ordinal: BundleId,
        /// Current height of the log
        height: u64,
    },
}

impl RootLogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RootLogError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports an inconsistent log file.
    pub fn is_corruption(&self) -> bool {
        matches!(self, RootLogError::Corrupted { .. })
    }
}
