//! # Adapters
//!
//! Filesystem-backed implementations.
//!
//! - `log_file`: the append-only root log for one pool
//! - `lock`: exclusive output-directory lock using fs2

pub mod lock;
pub mod log_file;
