//! # Run Logging
//!
//! Logging is a capability handed to the pipeline, not process-wide state.
//! A [`RunLogger`] owns the `Dispatch` a run logs to and the run's
//! correlation id; every stage gets its span from it and every spawned
//! task is bound to its dispatch.
//!
//! ```text
//! run{run_id=..}
//! ├── indexer{pool_id=..}     one per pool
//! ├── collector{worker=..}    one per worker
//! └── writer
//! ```

use std::future::Future;

use shared_types::PoolId;
use tracing::instrument::{Instrumented, WithDispatch, WithSubscriber};
use tracing::{dispatcher, info_span, Dispatch, Instrument, Span};
use uuid::Uuid;

/// Logging capability of one run.
#[derive(Clone, Debug)]
pub struct RunLogger {
    dispatch: Dispatch,
    run_id: Uuid,
}

impl RunLogger {
    /// Log to `dispatch` under a fresh run id.
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            run_id: Uuid::new_v4(),
        }
    }

    /// Log to whatever dispatch is current for the calling thread.
    pub fn current() -> Self {
        Self::new(dispatcher::get_default(Dispatch::clone))
    }

    /// Discard everything.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    /// Correlation id of the run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The dispatch this run logs to.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this run's dispatch as the default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// Root span of the run.
    pub fn run_span(&self) -> Span {
        self.in_scope(|| info_span!("run", run_id = %self.run_id))
    }

    /// Span of the indexer for `pool_id`.
    pub fn indexer_span(&self, parent: &Span, pool_id: PoolId) -> Span {
        self.in_scope(|| info_span!(parent: parent, "indexer", pool_id))
    }

    /// Span of collector number `worker`.
    pub fn collector_span(&self, parent: &Span, worker: usize) -> Span {
        self.in_scope(|| info_span!(parent: parent, "collector", worker))
    }

    /// Span of the writer.
    pub fn writer_span(&self, parent: &Span) -> Span {
        self.in_scope(|| info_span!(parent: parent, "writer"))
    }

    /// Bind `fut` to `span` and to this run's dispatch.
    pub fn attach<F: Future>(&self, span: Span, fut: F) -> WithDispatch<Instrumented<F>> {
        fut.instrument(span).with_subscriber(self.dispatch.clone())
    }
}
