//! Domain layer for the pipeline: errors, messages, the reorder queue.

pub mod errors;
pub mod messages;
pub mod min_queue;

pub use errors::PipelineError;
pub use messages::{PoolReport, RunReport, WriterMessage};
pub use min_queue::MinQueue;
