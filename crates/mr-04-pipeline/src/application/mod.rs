//! Application layer: the pipeline stages and the run that wires them.

pub mod collector;
pub mod indexer;
pub mod pipeline;
pub mod probe;
pub mod retry;
pub mod shutdown;
pub mod telemetry;
pub mod writer;

pub use collector::{compute_root, BundleCollector, SharedWorkQueue};
pub use indexer::BundleIndexer;
pub use pipeline::Pipeline;
pub use probe::{lookup_runtime, probe_bundle};
pub use retry::with_retry;
pub use shutdown::{ShutdownListener, ShutdownSignal};
pub use telemetry::RunLogger;
pub use writer::ReorderingWriter;
