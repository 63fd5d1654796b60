//! # Root Log (mr-02)
//!
//! The durable output of a run: one append-only file per pool holding the
//! reconstructed Merkle roots as a flat concatenation of 32-byte hashes.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Fixed width | Every entry is exactly 32 bytes, no header or footer |
//! | 2 | Ordinal = offset | Byte offset `N * 32` holds the root of bundle `N` |
//! | 3 | Resume from size | `size / 32` is the next ordinal to process |
//! | 4 | Atomic appends | A failed append leaves the file at its previous size |
//! | 5 | Corruption is loud | A size that is not a multiple of 32 is rejected |
//! | 6 | Single writer | An exclusive `LOCK` guards the output directory |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - File naming, errors
//! - `adapters/` - The on-disk log file and the directory lock
//! - `application/` - Resume-point tracking across configured pools

pub mod adapters;
pub mod application;
pub mod domain;

pub use adapters::lock::{LockError, OutputLock};
pub use adapters::log_file::RootLog;
pub use application::resume::{resume_height, resume_heights, ResumeState};
pub use domain::errors::RootLogError;
pub use domain::naming::{log_file_name, log_path};
