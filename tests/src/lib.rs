//! # Merkle Rebuild Test Suite
//!
//! Cross-crate scenarios driven through the full pipeline against an
//! in-memory upstream.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Payloads, upstream builder, pipeline runner
//! └── integration/
//!     ├── end_to_end.rs # Fresh runs, multi-pool, unbounded, runtimes
//!     ├── resume.rs     # Crash-resume, corruption, directory lock
//!     └── failures.rs   # Error propagation and retry
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mr-tests
//! cargo test -p mr-tests integration::resume::
//!
//! # Benchmarks
//! cargo bench -p mr-tests
//! ```

pub mod fixtures;
pub mod integration;
