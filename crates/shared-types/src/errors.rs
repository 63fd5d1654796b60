//! # Error Types
//!
//! Errors shared by more than one subsystem.

use thiserror::Error;

/// A runtime tag no leaf hashing scheme exists for.
///
/// This is a configuration error: the pool cannot be processed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("runtime not supported: {0}")]
pub struct UnsupportedRuntime(pub String);
