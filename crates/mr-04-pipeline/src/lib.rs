//! # MR-04 Rebuild Pipeline
//!
//! Concurrent reconstruction of historical Merkle roots for one or more
//! pools.
//!
//! **Subsystem ID:** 04  
//! **Architecture:** Hexagonal (application layer over mr-01..mr-03)
//!
//! ## Stages
//!
//! | Stage | Count | Reads | Writes |
//! |-------|-------|-------|--------|
//! | [`BundleIndexer`] | one per pool | ledger listing | work queue |
//! | [`BundleCollector`] | `workers` | work queue, storage | result queue |
//! | [`ReorderingWriter`] | one | result queue | root logs |
//!
//! Both queues are bounded, so a slow writer throttles the collectors and
//! slow collectors throttle the indexers.
//!
//! ## Ordering
//!
//! Collectors finish in any order. The writer buffers early roots in a
//! [`MinQueue`] keyed by ordinal and appends a root only when it is the
//! next one for its pool, so every log stays a gap-free prefix.
//!
//! ## Cancellation
//!
//! One [`ShutdownSignal`] per run. It is triggered by the first stage
//! error, by the writer once every pool is complete, or from outside via
//! [`Pipeline::shutdown_signal`]. Every blocking wait in every stage
//! selects against it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;

pub use application::{
    compute_root, lookup_runtime, probe_bundle, with_retry, BundleCollector, BundleIndexer,
    Pipeline, ReorderingWriter, RunLogger, ShutdownListener, ShutdownSignal,
};
pub use config::{PipelineConfig, RetryPolicy, DEFAULT_PAGE_SIZE, DEFAULT_QUEUE_DEPTH};
pub use domain::{MinQueue, PipelineError, PoolReport, RunReport, WriterMessage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
