//! # Resume, Corruption and Locking
//!
//! Runs against output directories left behind by earlier runs.

#[cfg(test)]
mod tests {
    use mr_02_root_log::{log_path, resume_height, OutputLock, RootLog};
    use mr_04_pipeline::PipelineError;
    use shared_types::RuntimeTag;
    use tempfile::tempdir;

    use crate::fixtures::{config, expected_root, run, tendermint_payload, Upstream};

    fn root(n: u64) -> shared_types::Hash {
        expected_root(&tendermint_payload(1, n), RuntimeTag::Tendermint)
    }

    #[tokio::test]
    async fn test_crash_resume_appends_only_missing_roots() {
        let dir = tempdir().unwrap();
        {
            let mut log = RootLog::open(dir.path(), 1).unwrap();
            log.append(&root(0)).unwrap();
            log.append(&root(1)).unwrap();
        }
        assert_eq!(std::fs::metadata(log_path(dir.path(), 1)).unwrap().len(), 64);

        let upstream = Upstream::new().tendermint_pool(1, 8).build();
        let report = run(config(dir.path(), &[(1, 5)]), &upstream).await.unwrap();

        let pool = report.pool(1).unwrap();
        assert_eq!(pool.start_height, 2);
        assert_eq!(pool.final_height, 5);
        assert_eq!(pool.appended(), 3);
        // Ordinals 0 and 1 were never downloaded again.
        assert_eq!(upstream.fetch_requests(), 3);
        assert_eq!(
            RootLog::read_all(dir.path(), 1).unwrap(),
            (0..5).map(root).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_interrupted_run_then_restart_matches_single_run() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 10).build();

        run(config(dir.path(), &[(1, 4)]), &upstream).await.unwrap();
        run(config(dir.path(), &[(1, 10)]), &upstream).await.unwrap();

        let fresh = tempdir().unwrap();
        run(config(fresh.path(), &[(1, 10)]), &upstream)
            .await
            .unwrap();
        assert_eq!(
            RootLog::read_all(dir.path(), 1).unwrap(),
            RootLog::read_all(fresh.path(), 1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_rerun_at_target_is_a_no_op() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 4).build();

        run(config(dir.path(), &[(1, 4)]), &upstream).await.unwrap();
        let downloads = upstream.fetch_requests();

        let report = run(config(dir.path(), &[(1, 4)]), &upstream).await.unwrap();
        assert_eq!(report.total_appended(), 0);
        assert_eq!(upstream.fetch_requests(), downloads);
        assert_eq!(resume_height(dir.path(), 1).unwrap(), 4);
    }

    #[tokio::test]
    async fn test_corrupted_log_refuses_to_start() {
        let dir = tempdir().unwrap();
        std::fs::write(log_path(dir.path(), 1), vec![0u8; 70]).unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 4).build();

        let err = run(config(dir.path(), &[(1, 4)]), &upstream)
            .await
            .unwrap_err();
        assert!(err.is_corruption());
        assert_eq!(upstream.page_requests(), 0);
        // Left untouched for inspection.
        assert_eq!(std::fs::metadata(log_path(dir.path(), 1)).unwrap().len(), 70);
    }

    #[tokio::test]
    async fn test_locked_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let _held = OutputLock::acquire(dir.path()).unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 4).build();

        let err = run(config(dir.path(), &[(1, 4)]), &upstream)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Lock(_)));
        assert_eq!(resume_height(dir.path(), 1).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lock_released_after_run() {
        let dir = tempdir().unwrap();
        let upstream = Upstream::new().tendermint_pool(1, 2).build();

        run(config(dir.path(), &[(1, 2)]), &upstream).await.unwrap();
        assert!(OutputLock::acquire(dir.path()).is_ok());
    }
}
