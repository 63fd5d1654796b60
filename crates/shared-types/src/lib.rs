//! # Shared Types Crate
//!
//! Entities that cross crate boundaries in the Merkle rebuild pipeline.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that travels through a pipeline
//!   queue is defined here, so the indexer, collectors and writer agree on
//!   one representation.
//! - **Plain data**: No I/O, no async. Behaviour lives in the subsystem
//!   crates (`mr-01` .. `mr-04`).

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
