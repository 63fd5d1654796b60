//! # Pipeline
//!
//! Wires the stages of one run together.
//!
//! ```text
//!  indexer(pool A) ─┐                        ┌─ collector 0 ─┐
//!  indexer(pool B) ─┼─► work queue (bounded) ┼─ collector 1 ─┼─► result queue ─► writer ─► logs
//!  indexer(pool C) ─┘                        └─ collector N ─┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. Validate config, lock the output directory, read resume heights.
//! 2. Resolve every pool's runtime. Any failure here ends the run.
//! 3. Spawn all stages into one `JoinSet`.
//! 4. The first stage error is recorded and triggers shutdown; the writer
//!    triggers shutdown on completion. Either way every stage drains.
//! 5. Return the first error, or the writer's report.

use std::future::Future;
use std::sync::Arc;

use mr_02_root_log::{resume_heights, OutputLock, ResumeState};
use mr_03_bundle_source::{BundleFetcher, BundleSource};
use shared_types::{PoolId, RuntimeTag};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use super::collector::BundleCollector;
use super::indexer::BundleIndexer;
use super::probe::lookup_runtime;
use super::shutdown::ShutdownSignal;
use super::telemetry::RunLogger;
use super::writer::ReorderingWriter;
use crate::config::PipelineConfig;
use crate::domain::{PipelineError, PoolReport, RunReport};

/// One run of the rebuild pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    source: Arc<dyn BundleSource>,
    fetcher: Arc<dyn BundleFetcher>,
    logger: RunLogger,
    shutdown: ShutdownSignal,
}

impl Pipeline {
    /// Create a run. Nothing happens until [`run`](Self::run).
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn BundleSource>,
        fetcher: Arc<dyn BundleFetcher>,
        logger: RunLogger,
    ) -> Self {
        Self {
            config,
            source,
            fetcher,
            logger,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Handle that cancels the run when triggered.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Correlation id of this run.
    pub fn run_id(&self) -> Uuid {
        self.logger.run_id()
    }

    /// Run until every pool reaches its target, or the first error.
    pub async fn run(self) -> Result<RunReport, PipelineError> {
        let span = self.logger.run_span();
        let logger = self.logger.clone();
        logger.attach(span, self.execute()).await
    }

    async fn execute(self) -> Result<RunReport, PipelineError> {
        self.config.validate()?;
        let output_dir = self.config.output_dir.clone();

        let lock = OutputLock::acquire(&output_dir)?;
        info!(
            output_dir = %output_dir.display(),
            pid = lock.pid(),
            pools = self.config.pools.len(),
            workers = self.config.workers,
            "Starting Merkle root rebuild"
        );

        let resume = resume_heights(&output_dir, &self.config.pools)?;
        let runtimes = self.resolve_runtimes().await?;

        if self.config.pools.iter().all(|p| resume.is_complete(p)) {
            info!("Every pool already at target, nothing to do");
            return Ok(self.idle_report(&resume));
        }

        let report = self.spawn_stages(&resume, runtimes).await;
        drop(lock);
        report
    }

    async fn resolve_runtimes(&self) -> Result<Vec<(PoolId, RuntimeTag)>, PipelineError> {
        let mut shutdown = self.shutdown.subscribe();
        let mut runtimes = Vec::with_capacity(self.config.pools.len());
        for pool in &self.config.pools {
            let lookup = lookup_runtime(self.source.as_ref(), &self.config.retry, pool.pool_id);
            let runtime = tokio::select! {
                _ = shutdown.wait() => return Err(PipelineError::Cancelled),
                runtime = lookup => runtime?,
            };
            info!(pool_id = pool.pool_id, %runtime, "Resolved pool runtime");
            runtimes.push((pool.pool_id, runtime));
        }
        Ok(runtimes)
    }

    async fn spawn_stages(
        &self,
        resume: &ResumeState,
        runtimes: Vec<(PoolId, RuntimeTag)>,
    ) -> Result<RunReport, PipelineError> {
        let config = &self.config;
        let run_span = tracing::Span::current();

        let (work_tx, work_rx) = mpsc::channel(config.queue_depth);
        let (result_tx, result_rx) = mpsc::channel(config.result_queue_depth);
        let (error_tx, mut error_rx) = mpsc::unbounded_channel();
        let mut tasks: JoinSet<Option<RunReport>> = JoinSet::new();

        let writer = ReorderingWriter::open(
            &config.output_dir,
            &config.pools,
            result_rx,
            self.shutdown.clone(),
            self.logger.run_id(),
        )?;
        let stage = supervise(writer.run(), self.shutdown.clone(), error_tx.clone());
        tasks.spawn(self.logger.attach(self.logger.writer_span(&run_span), stage));

        let work_rx = Arc::new(Mutex::new(work_rx));
        for worker in 0..config.workers {
            let collector = BundleCollector::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&work_rx),
                result_tx.clone(),
                config.retry.clone(),
                self.shutdown.subscribe(),
            );
            let stage = supervise(collector.run(), self.shutdown.clone(), error_tx.clone());
            let span = self.logger.collector_span(&run_span, worker);
            tasks.spawn(self.logger.attach(span, async move {
                let _ = stage.await;
                None::<RunReport>
            }));
        }

        for (pool, (_, runtime)) in config.pools.iter().zip(runtimes) {
            let indexer = BundleIndexer::new(
                *pool,
                runtime,
                resume.height(pool.pool_id),
                Arc::clone(&self.source),
                work_tx.clone(),
                result_tx.clone(),
                config,
                self.shutdown.subscribe(),
            );
            let stage = supervise(indexer.run(), self.shutdown.clone(), error_tx.clone());
            let span = self.logger.indexer_span(&run_span, pool.pool_id);
            tasks.spawn(self.logger.attach(span, async move {
                let _ = stage.await;
                None::<RunReport>
            }));
        }

        // The queues close once the stages holding them finish.
        drop(work_tx);
        drop(result_tx);
        drop(error_tx);

        let mut report = None;
        let mut panicked = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(done)) => report = Some(done),
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Pipeline task failed");
                    self.shutdown.trigger();
                    panicked.get_or_insert(PipelineError::TaskFailed(e.to_string()));
                }
            }
        }

        if let Ok(first) = error_rx.try_recv() {
            return Err(first);
        }
        if let Some(e) = panicked {
            return Err(e);
        }
        let report = report.ok_or(PipelineError::Cancelled)?;
        for pool in &report.pools {
            info!(
                pool_id = pool.pool_id,
                start_height = pool.start_height,
                final_height = pool.final_height,
                appended = pool.appended(),
                "Pool finished"
            );
        }
        Ok(report)
    }

    fn idle_report(&self, resume: &ResumeState) -> RunReport {
        RunReport {
            run_id: self.logger.run_id(),
            pools: self
                .config
                .pools
                .iter()
                .map(|p| PoolReport {
                    pool_id: p.pool_id,
                    start_height: resume.height(p.pool_id),
                    final_height: resume.height(p.pool_id),
                })
                .collect(),
        }
    }
}

/// Run a stage; on failure record the error and cancel the run.
///
/// `Cancelled` is the expected outcome of a stage stopped by someone else
/// and is not recorded.
async fn supervise<T, F>(
    stage: F,
    shutdown: ShutdownSignal,
    errors: mpsc::UnboundedSender<PipelineError>,
) -> Option<T>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    match stage.await {
        Ok(value) => Some(value),
        Err(PipelineError::Cancelled) => None,
        Err(e) => {
            error!(error = %e, "Stage failed, shutting down");
            let _ = errors.send(e);
            shutdown.trigger();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mr_02_root_log::RootLog;
    use mr_03_bundle_source::{Compression, InMemoryBundleSource, SourceError};
    use shared_types::PoolTarget;
    use std::time::Duration;
    use tempfile::tempdir;

    fn payload(n: u64) -> Vec<u8> {
        format!(
            r#"[{{"key":"{n}","value":{{"block":{{"h":{n}}},"block_results":{{"r":{n}}}}}}}]"#
        )
        .into_bytes()
    }

    fn source(pools: &[(PoolId, u64)]) -> InMemoryBundleSource {
        let mut source = InMemoryBundleSource::new();
        for &(pool_id, bundles) in pools {
            source.add_pool(pool_id, "@kyvejs/tendermint");
            for n in 0..bundles {
                source.add_bundle(pool_id, &payload(n), Compression::Gzip);
            }
        }
        source
    }

    fn pipeline(
        source: InMemoryBundleSource,
        config: PipelineConfig,
    ) -> (Pipeline, Arc<InMemoryBundleSource>) {
        let source = Arc::new(source);
        let pipeline = Pipeline::new(
            config,
            Arc::clone(&source) as Arc<dyn BundleSource>,
            Arc::clone(&source) as Arc<dyn BundleFetcher>,
            RunLogger::disabled(),
        );
        (pipeline, source)
    }

    #[tokio::test]
    async fn test_run_reaches_every_target() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::for_testing(
            dir.path(),
            vec![PoolTarget::new(1, 5), PoolTarget::new(2, 3)],
        );
        let (pipeline, _source) = pipeline(source(&[(1, 8), (2, 8)]), config);

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.pool(1).unwrap().final_height, 5);
        assert_eq!(report.pool(2).unwrap().final_height, 3);
        assert_eq!(RootLog::read_all(dir.path(), 1).unwrap().len(), 5);
        assert_eq!(RootLog::read_all(dir.path(), 2).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_slow_downloads_do_not_reorder_log() {
        let dir = tempdir().unwrap();
        let mut source = source(&[(1, 6)]);
        source.delay_fetch(1, 0, Duration::from_millis(40));
        source.delay_fetch(1, 2, Duration::from_millis(20));
        let config = PipelineConfig::for_testing(dir.path(), vec![PoolTarget::new(1, 6)]);
        let (pipeline, _source) = pipeline(source, config);

        pipeline.run().await.unwrap();

        let expected: Vec<_> = (0..6)
            .map(|n| {
                let items = mr_01_merkle_tree::decode_bundle(&payload(n)).unwrap();
                mr_01_merkle_tree::bundle_root(&items, RuntimeTag::Tendermint).unwrap()
            })
            .collect();
        assert_eq!(RootLog::read_all(dir.path(), 1).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_complete_pools_skip_listing() {
        let dir = tempdir().unwrap();
        std::fs::write(mr_02_root_log::log_path(dir.path(), 1), [0u8; 96]).unwrap();
        let config = PipelineConfig::for_testing(dir.path(), vec![PoolTarget::new(1, 3)]);
        let (pipeline, source) = pipeline(source(&[(1, 5)]), config);

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.total_appended(), 0);
        assert_eq!(source.page_requests(), 0);
        assert_eq!(source.fetch_requests(), 0);
    }

    #[tokio::test]
    async fn test_first_error_is_returned() {
        let dir = tempdir().unwrap();
        let mut source = source(&[(1, 6)]);
        source.fail_fetch(1, 3, 1, SourceError::Http {
            status: 500,
            url: "memory://x".into(),
        });
        let config = PipelineConfig::for_testing(dir.path(), vec![PoolTarget::new(1, 6)]);
        let (pipeline, _source) = pipeline(source, config);

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Source {
                bundle_id: Some(3),
                ..
            }
        ));
        assert!(RootLog::read_all(dir.path(), 1).unwrap().len() <= 3);
    }

    #[tokio::test]
    async fn test_unsupported_runtime_fails_before_work() {
        let dir = tempdir().unwrap();
        let mut source = source(&[(1, 3)]);
        source.add_pool(1, "@kyvejs/evm");
        let config = PipelineConfig::for_testing(dir.path(), vec![PoolTarget::new(1, 3)]);
        let (pipeline, source) = pipeline(source, config);

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedRuntime { pool_id: 1, .. }));
        assert_eq!(source.page_requests(), 0);
    }

    #[tokio::test]
    async fn test_external_shutdown_cancels_run() {
        let dir = tempdir().unwrap();
        let mut source = source(&[(1, 4)]);
        source.delay_fetch(1, 0, Duration::from_secs(30));
        let config = PipelineConfig::for_testing(dir.path(), vec![PoolTarget::new(1, 4)]);
        let (pipeline, _source) = pipeline(source, config);
        let signal = pipeline.shutdown_signal();

        let handle = tokio::spawn(pipeline.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        signal.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::for_testing(dir.path(), vec![]);
        let (pipeline, _source) = pipeline(source(&[]), config);
        assert!(pipeline.run().await.unwrap_err().is_configuration());
    }
}
