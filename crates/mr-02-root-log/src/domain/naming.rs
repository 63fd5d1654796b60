//! # Log File Naming
//!
//! The path of a pool's log is derived from the pool id alone, so a rerun
//! against the same directory always finds the same file.

use std::path::{Path, PathBuf};

use shared_types::PoolId;

/// Prefix of every root log file name.
pub const LOG_FILE_PREFIX: &str = "merkle_roots_pool_";

/// File name of the log for `pool_id`.
pub fn log_file_name(pool_id: PoolId) -> String {
    format!("{}{}", LOG_FILE_PREFIX, pool_id)
}

/// Full path of the log for `pool_id` inside `dir`.
pub fn log_path(dir: &Path, pool_id: PoolId) -> PathBuf {
    dir.join(log_file_name(pool_id))
}
