//! # Domain Layer
//!
//! File naming and error types for the root log.

pub mod errors;
pub mod naming;
