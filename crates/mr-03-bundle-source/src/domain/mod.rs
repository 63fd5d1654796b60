//! Domain layer for the bundle source.

pub mod entities;
pub mod errors;
pub mod payload;

pub use entities::*;
pub use errors::*;
pub use payload::{decompress, open_payload, verify_data_hash};
