//! # Failure Propagation
//!
//! Every stage failure ends the whole run with a typed error; transient
//! upstream failures are retried only when the policy allows it.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mr_01_merkle_tree::MerkleError;
    use mr_02_root_log::{resume_height, RootLog};
    use mr_03_bundle_source::{Compression, SourceError};
    use mr_04_pipeline::{PipelineError, RetryPolicy};
    use tempfile::tempdir;

    use crate::fixtures::{config, pipeline, run, Upstream};

    fn unavailable() -> SourceError {
        SourceError::Http {
            status: 503,
            url: "memory://storage".into(),
        }
    }

    #[tokio::test]
    async fn test_unsupported_runtime_is_typed_error() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 3)
            .with(|s| {
                s.add_pool(2, "@kyvejs/celestia");
            })
            .build();

        let err = run(config(dir.path(), &[(1, 3), (2, 3)]), &upstream)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            PipelineError::UnsupportedRuntime { pool_id: 2, ref runtime } if runtime == "@kyvejs/celestia"
        ));
        // Nothing started.
        assert_eq!(upstream.page_requests(), 0);
        assert_eq!(resume_height(dir.path(), 1).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_target_beyond_latest_is_typed_error() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 4).build();

        let err = run(config(dir.path(), &[(1, 9)]), &upstream)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TargetBeyondLatest {
                pool_id: 1,
                target: 9,
                latest: 4
            }
        ));
        // Whatever was written is still a valid prefix.
        assert!(resume_height(dir.path(), 1).unwrap() <= 4);
    }

    #[tokio::test]
    async fn test_download_failure_stops_every_pool() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 40)
            .tendermint_pool(2, 40)
            .with(|s| {
                s.fail_fetch(1, 2, 1, unavailable());
            })
            .build();

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            run(config(dir.path(), &[(1, 40), (2, 40)]), &upstream),
        )
        .await
        .expect("run must stop after the first error");

        assert!(matches!(
            result.unwrap_err(),
            PipelineError::Source {
                pool_id: 1,
                bundle_id: Some(2),
                ..
            }
        ));
        assert!(resume_height(dir.path(), 1).unwrap() <= 2);
        assert!(upstream.fetch_requests() < 80);
    }

    #[tokio::test]
    async fn test_listing_failure_is_propagated() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 5)
            .with(|s| {
                s.fail_listing(1, 1, SourceError::Network("connection reset".into()));
            })
            .build();

        let err = run(config(dir.path(), &[(1, 5)]), &upstream)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Source {
                bundle_id: None,
                source: SourceError::Network(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transient_failures_recovered_by_retry() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 5)
            .with(|s| {
                s.fail_listing(1, 2, SourceError::Network("connection reset".into()));
                s.fail_fetch(1, 3, 2, unavailable());
            })
            .build();
        let mut config = config(dir.path(), &[(1, 5)]);
        config.retry = RetryPolicy {
            max_attempts: 3,
            backoff_ms: 1,
        };

        let report = run(config, &upstream).await.unwrap();
        assert_eq!(report.total_appended(), 5);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 3)
            .with(|s| {
                s.fail_fetch(1, 1, 5, SourceError::Http {
                    status: 404,
                    url: "memory://gone".into(),
                });
            })
            .build();
        let mut config = config(dir.path(), &[(1, 3)]);
        config.retry = RetryPolicy {
            max_attempts: 5,
            backoff_ms: 1,
        };

        let err = run(config, &upstream).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Source {
                source: SourceError::Http { status: 404, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_tampered_payload_fails_hash_check() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 3)
            .with(|s| {
                s.tamper_payload(1, 1);
            })
            .build();

        let err = run(config(dir.path(), &[(1, 3)]), &upstream)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Source {
                bundle_id: Some(1),
                source: SourceError::DataHashMismatch { .. },
                ..
            }
        ));
        assert!(RootLog::read_all(dir.path(), 1).unwrap().len() <= 1);
    }

    #[tokio::test]
    async fn test_empty_bundle_is_merkle_error() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 1)
            .with(|s| {
                s.add_bundle(1, b"[]", Compression::None);
            })
            .build();

        let err = run(config(dir.path(), &[(1, 2)]), &upstream)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Merkle {
                bundle_id: 1,
                source: MerkleError::EmptyLeaves,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_gap_in_listing_is_configuration_error() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 6)
            .with(|s| {
                s.remove_from_listing(1, 2);
            })
            .build();

        let err = run(config(dir.path(), &[(1, 6)]), &upstream)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            PipelineError::NonConsecutive {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_run_leaves_valid_prefix() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 10)
            .with(|s| {
                s.delay_fetch(1, 6, Duration::from_secs(60));
            })
            .build();

        let pipeline = pipeline(config(dir.path(), &[(1, 10)]), &upstream);
        let signal = pipeline.shutdown_signal();
        let handle = tokio::spawn(pipeline.run());

        let mut waited = Duration::ZERO;
        while resume_height(dir.path(), 1).unwrap() < 6 && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(5)).await;
            waited += Duration::from_millis(5);
        }
        signal.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(PipelineError::Cancelled)));
        assert_eq!(resume_height(dir.path(), 1).unwrap(), 6);
    }
}
