//! # Application Layer
//!
//! Resume-point tracking.

pub mod resume;
