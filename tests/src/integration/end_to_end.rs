//! # End-to-End Runs
//!
//! Fresh output directories, one or more pools, both runtimes.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mr_02_root_log::{resume_height, RootLog};
    use shared_types::RuntimeTag;
    use tempfile::tempdir;

    use crate::fixtures::{
        bsync_payload, config, expected_root, pipeline, run, tendermint_payload, Upstream,
    };

    #[tokio::test]
    async fn test_fresh_run_appends_target_roots() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 5).build();

        let pipeline = pipeline(config(dir.path(), &[(1, 3)]), &upstream);
        let signal = pipeline.shutdown_signal();
        let report = pipeline.run().await.unwrap();

        // Completion is signalled by the writer.
        assert!(signal.is_triggered());
        assert_eq!(report.total_appended(), 3);
        assert_eq!(resume_height(dir.path(), 1).unwrap(), 3);
        assert_eq!(
            std::fs::metadata(mr_02_root_log::log_path(dir.path(), 1))
                .unwrap()
                .len(),
            96
        );

        let expected: Vec<_> = (0..3)
            .map(|n| expected_root(&tendermint_payload(1, n), RuntimeTag::Tendermint))
            .collect();
        assert_eq!(RootLog::read_all(dir.path(), 1).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_bsync_pool_uses_canonical_leaves() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().bsync_pool(2, 4).build();

        run(config(dir.path(), &[(2, 4)]), &upstream).await.unwrap();

        let expected: Vec<_> = (0..4)
            .map(|n| expected_root(&bsync_payload(n), RuntimeTag::TendermintBsync))
            .collect();
        assert_eq!(RootLog::read_all(dir.path(), 2).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_multi_pool_completes_only_when_all_reach_target() {
        let dir = tempdir().unwrap();
        // Pool 1 is short and fast; pool 2's last bundle is slow.
        let upstream = Upstream::new()
            .tendermint_pool(1, 3)
            .tendermint_pool(2, 6)
            .with(|s| {
                s.delay_fetch(2, 5, Duration::from_millis(200));
            })
            .build();

        let pipeline = pipeline(config(dir.path(), &[(1, 2), (2, 6)]), &upstream);
        let signal = pipeline.shutdown_signal();
        let handle = tokio::spawn(pipeline.run());

        let mut waited = Duration::ZERO;
        while resume_height(dir.path(), 1).unwrap() < 2 && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(5)).await;
            waited += Duration::from_millis(5);
        }
        assert_eq!(resume_height(dir.path(), 1).unwrap(), 2);
        assert!(!signal.is_triggered());

        let report = handle.await.unwrap().unwrap();
        assert!(signal.is_triggered());
        assert_eq!(report.pool(1).unwrap().final_height, 2);
        assert_eq!(report.pool(2).unwrap().final_height, 6);
    }

    #[tokio::test]
    async fn test_unbounded_pool_runs_to_latest() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().tendermint_pool(4, 23).build();

        let report = run(config(dir.path(), &[(4, 0)]), &upstream).await.unwrap();

        assert_eq!(report.pool(4).unwrap().final_height, 23);
        assert_eq!(RootLog::read_all(dir.path(), 4).unwrap().len(), 23);
    }

    #[tokio::test]
    async fn test_single_worker_and_tiny_queues() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new()
            .tendermint_pool(1, 12)
            .bsync_pool(2, 12)
            .build();
        let mut config = config(dir.path(), &[(1, 12), (2, 9)]);
        config.workers = 1;
        config.queue_depth = 1;
        config.result_queue_depth = 1;
        config.page_size = 1;

        let report = run(config, &upstream).await.unwrap();
        assert_eq!(report.total_appended(), 21);
    }

    #[tokio::test]
    async fn test_many_workers_with_random_delays_keep_order() {
        use rand::Rng;

        let dir = tempdir().unwrap();
        let mut rng = rand::thread_rng();
        let delays: Vec<u64> = (0..30).map(|_| rng.gen_range(0..15)).collect();
        let upstream = Upstream::new()
            .tendermint_pool(1, 30)
            .with(|s| {
                for (bundle_id, ms) in delays.iter().enumerate() {
                    s.delay_fetch(1, bundle_id as u64, Duration::from_millis(*ms));
                }
            })
            .build();
        let mut config = config(dir.path(), &[(1, 30)]);
        config.workers = 8;

        run(config, &upstream).await.unwrap();

        let expected: Vec<_> = (0..30)
            .map(|n| expected_root(&tendermint_payload(1, n), RuntimeTag::Tendermint))
            .collect();
        assert_eq!(RootLog::read_all(dir.path(), 1).unwrap(), expected);
    }
}
