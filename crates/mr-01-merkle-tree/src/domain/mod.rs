//! # Domain Module
//!
//! Data items as archived in a bundle, and the errors of this subsystem.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
