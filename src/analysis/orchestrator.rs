use super::analyzer::{KeyCharacteristicsAnalyzer, ReadWriteDistributionAnalyzer};
use super::request::{AnalyzeShardKeyRequest, AnalyzeShardKeyResponse};
use super::toggles::AnalysisToggles;
use super::validation::{NamespaceValidator, validate_namespace, validate_run_context};
use crate::connection::OperationContext;
use crate::core::{DeploymentContext, Result};
use std::sync::Arc;
use tracing::{debug, info};

const START_ANALYSIS_LOG_ID: u32 = 6875001;

/// Validates the target, then runs the key-characteristics phase followed by
/// the read/write-distribution phase.
///
/// Phases never overlap. A toggle can skip a phase; an error in either phase
/// aborts the invocation without a partial response.
pub struct ShardKeyAnalysisOrchestrator {
    validator: Arc<dyn NamespaceValidator>,
    key_characteristics: Arc<dyn KeyCharacteristicsAnalyzer>,
    read_write_distribution: Arc<dyn ReadWriteDistributionAnalyzer>,
    toggles: Arc<AnalysisToggles>,
}

impl ShardKeyAnalysisOrchestrator {
    pub fn new(
        validator: Arc<dyn NamespaceValidator>,
        key_characteristics: Arc<dyn KeyCharacteristicsAnalyzer>,
        read_write_distribution: Arc<dyn ReadWriteDistributionAnalyzer>,
        toggles: Arc<AnalysisToggles>,
    ) -> Self {
        Self {
            validator,
            key_characteristics,
            read_write_distribution,
            toggles,
        }
    }

    pub fn toggles(&self) -> &Arc<AnalysisToggles> {
        &self.toggles
    }

    pub async fn run(
        &self,
        op: &OperationContext,
        request: &AnalyzeShardKeyRequest,
        deployment: &DeploymentContext,
    ) -> Result<AnalyzeShardKeyResponse> {
        let nss = &request.namespace;
        let key = &request.key;

        validate_run_context(deployment)?;
        validate_namespace(nss)?;
        let collection_uuid = self.validator.validate(op, nss).await?;

        info!(
            id = START_ANALYSIS_LOG_ID,
            op_id = op.id(),
            namespace = %nss,
            collection_uuid = %collection_uuid,
            shard_key = %key,
            "Start analyzing shard key"
        );

        let mut response = AnalyzeShardKeyResponse::default();

        op.check_for_interrupt()?;
        if self.toggles.skip_key_characteristics() {
            debug!(namespace = %nss, "Skipping key characteristics metrics");
        } else {
            let metrics = self
                .key_characteristics
                .analyze(op, nss, collection_uuid, key)
                .await?;
            response.set_key_characteristics(metrics);
        }

        // Query sampling is not supported on multitenant replica sets.
        op.check_for_interrupt()?;
        if deployment.multitenancy_support {
            debug!(namespace = %nss, "Skipping read/write distribution metrics on a multitenant deployment");
        } else if self.toggles.skip_read_write_distribution() {
            debug!(namespace = %nss, "Skipping read/write distribution metrics");
        } else {
            let (read, write) = self
                .read_write_distribution
                .analyze(op, nss, collection_uuid, key)
                .await?;
            response.set_read_write_distribution(read, write);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::request::ORPHAN_DOCS_WARNING;
    use crate::analysis::validation::CatalogValidator;
    use crate::connection::Interrupter;
    use crate::connection::auth::{Privilege, User};
    use crate::connection::config::AnalysisParameters;
    use crate::core::{
        ClusterRole, CollectionUuid, DbError, KeyCharacteristicsMetrics, Namespace,
        ReadDistributionMetrics, ReadSampleSize, ShardKeyPattern, WriteDistributionMetrics,
    };
    use crate::storage::{CatalogHandle, CollectionOptions};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubKeyAnalyzer {
        calls: AtomicUsize,
        outcome: Result<KeyCharacteristicsMetrics>,
        interrupt_after: Option<Interrupter>,
    }

    impl StubKeyAnalyzer {
        fn returning(outcome: Result<KeyCharacteristicsMetrics>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
                interrupt_after: None,
            })
        }
    }

    #[async_trait]
    impl KeyCharacteristicsAnalyzer for StubKeyAnalyzer {
        async fn analyze(
            &self,
            _op: &OperationContext,
            _nss: &Namespace,
            _collection_uuid: CollectionUuid,
            _key: &ShardKeyPattern,
        ) -> Result<KeyCharacteristicsMetrics> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(interrupter) = &self.interrupt_after {
                interrupter.interrupt();
            }
            self.outcome.clone()
        }
    }

    struct StubDistributionAnalyzer {
        calls: AtomicUsize,
        outcome: Result<(ReadDistributionMetrics, WriteDistributionMetrics)>,
    }

    impl StubDistributionAnalyzer {
        fn returning(outcome: Result<(ReadDistributionMetrics, WriteDistributionMetrics)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }
    }

    #[async_trait]
    impl ReadWriteDistributionAnalyzer for StubDistributionAnalyzer {
        async fn analyze(
            &self,
            _op: &OperationContext,
            _nss: &Namespace,
            _collection_uuid: CollectionUuid,
            _key: &ShardKeyPattern,
        ) -> Result<(ReadDistributionMetrics, WriteDistributionMetrics)> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn characteristics(num_orphan_docs: i64) -> KeyCharacteristicsMetrics {
        KeyCharacteristicsMetrics {
            num_docs: 1000,
            is_unique: false,
            num_distinct_values: 250,
            avg_doc_size_bytes: 96,
            num_orphan_docs: Some(num_orphan_docs),
            ..Default::default()
        }
    }

    fn distribution() -> (ReadDistributionMetrics, WriteDistributionMetrics) {
        let read = ReadDistributionMetrics {
            sample_size: ReadSampleSize {
                total: 10,
                find: 10,
                ..Default::default()
            },
            percentage_of_single_shard_reads: Some(100.0),
            ..Default::default()
        };
        (read, WriteDistributionMetrics::default())
    }

    struct Harness {
        orchestrator: ShardKeyAnalysisOrchestrator,
        keys: Arc<StubKeyAnalyzer>,
        distribution: Arc<StubDistributionAnalyzer>,
        toggles: Arc<AnalysisToggles>,
    }

    fn harness(keys: Arc<StubKeyAnalyzer>, distribution: Arc<StubDistributionAnalyzer>) -> Harness {
        let catalog = CatalogHandle::default();
        catalog
            .create_collection(Namespace::parse("db.orders").unwrap(), CollectionOptions::default())
            .unwrap();
        let toggles = Arc::new(AnalysisToggles::new(&AnalysisParameters::default()));
        let orchestrator = ShardKeyAnalysisOrchestrator::new(
            Arc::new(CatalogValidator::new(catalog)),
            keys.clone(),
            distribution.clone(),
            toggles.clone(),
        );
        Harness {
            orchestrator,
            keys,
            distribution,
            toggles,
        }
    }

    fn default_harness(num_orphan_docs: i64) -> Harness {
        harness(
            StubKeyAnalyzer::returning(Ok(characteristics(num_orphan_docs))),
            StubDistributionAnalyzer::returning(Ok(distribution())),
        )
    }

    fn op() -> OperationContext {
        OperationContext::new(
            User::new("admin".into(), "hash".into(), vec![Privilege::root()]),
            Interrupter::new(),
        )
    }

    fn request(ns: &str) -> AnalyzeShardKeyRequest {
        AnalyzeShardKeyRequest::new(
            Namespace::parse(ns).unwrap(),
            ShardKeyPattern::ranged(["customerId"]).unwrap(),
        )
    }

    impl Harness {
        fn key_calls(&self) -> usize {
            self.keys.calls.load(Ordering::SeqCst)
        }

        fn distribution_calls(&self) -> usize {
            self.distribution.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_full_analysis_without_orphans() {
        let h = default_harness(0);
        let response = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::replica_set())
            .await
            .unwrap();

        assert_eq!(response.key_characteristics, Some(characteristics(0)));
        assert_eq!(response.read_distribution, Some(distribution().0));
        assert_eq!(response.write_distribution, Some(distribution().1));
        assert!(response.note.is_none());
    }

    #[tokio::test]
    async fn test_orphans_attach_note() {
        let h = default_harness(42);
        let response = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::replica_set())
            .await
            .unwrap();

        assert_eq!(response.note.as_deref(), Some(ORPHAN_DOCS_WARNING));
        assert!(response.read_distribution.is_some());
    }

    #[tokio::test]
    async fn test_standalone_invokes_no_analyzer() {
        let h = default_harness(0);
        let err = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::standalone())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::IllegalOperation(_)));
        assert_eq!(h.key_calls(), 0);
        assert_eq!(h.distribution_calls(), 0);
    }

    #[tokio::test]
    async fn test_config_server_invokes_no_analyzer() {
        let h = default_harness(0);
        let deployment = DeploymentContext::replica_set().cluster_role(ClusterRole::ConfigServer);
        let err = h
            .orchestrator
            .run(&op(), &request("db.orders"), &deployment)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("configsvr"));
        assert_eq!(h.key_calls() + h.distribution_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_namespace_invokes_no_analyzer() {
        let h = default_harness(0);
        let err = h
            .orchestrator
            .run(&op(), &request("db.missing"), &DeploymentContext::replica_set())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NamespaceNotFound(_)));
        assert_eq!(h.key_calls() + h.distribution_calls(), 0);
    }

    #[tokio::test]
    async fn test_multitenancy_skips_distribution_regardless_of_toggle() {
        for skip in [false, true] {
            let h = default_harness(0);
            h.toggles.set_skip_read_write_distribution(skip);
            let deployment = DeploymentContext::replica_set().multitenancy(true);

            let response = h
                .orchestrator
                .run(&op(), &request("db.orders"), &deployment)
                .await
                .unwrap();

            assert!(response.key_characteristics.is_some());
            assert!(response.read_distribution.is_none());
            assert!(response.write_distribution.is_none());
            assert_eq!(h.distribution_calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_characteristics_toggle_skips_only_that_phase() {
        let h = default_harness(42);
        h.toggles.set_skip_key_characteristics(true);

        let response = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::replica_set())
            .await
            .unwrap();

        assert!(response.key_characteristics.is_none());
        assert!(response.note.is_none());
        assert!(response.read_distribution.is_some());
        assert_eq!(h.key_calls(), 0);
        assert_eq!(h.distribution_calls(), 1);
    }

    #[tokio::test]
    async fn test_both_toggles_yield_empty_response() {
        let h = default_harness(0);
        h.toggles.set_skip_key_characteristics(true);
        h.toggles.set_skip_read_write_distribution(true);

        let response = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::replica_set())
            .await
            .unwrap();

        assert_eq!(response, AnalyzeShardKeyResponse::default());
    }

    #[tokio::test]
    async fn test_characteristics_failure_aborts_before_distribution() {
        let failure = DbError::IllegalOperation("no supporting index".into());
        let h = harness(
            StubKeyAnalyzer::returning(Err(failure.clone())),
            StubDistributionAnalyzer::returning(Ok(distribution())),
        );

        let err = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::replica_set())
            .await
            .unwrap_err();

        assert_eq!(err, failure);
        assert_eq!(h.distribution_calls(), 0);
    }

    #[tokio::test]
    async fn test_distribution_failure_discards_characteristics() {
        let failure = DbError::InternalError("sampling failed".into());
        let h = harness(
            StubKeyAnalyzer::returning(Ok(characteristics(0))),
            StubDistributionAnalyzer::returning(Err(failure.clone())),
        );

        let result = h
            .orchestrator
            .run(&op(), &request("db.orders"), &DeploymentContext::replica_set())
            .await;

        assert_eq!(result.unwrap_err(), failure);
        assert_eq!(h.key_calls(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_between_phases() {
        let op = op();
        let keys = Arc::new(StubKeyAnalyzer {
            calls: AtomicUsize::new(0),
            outcome: Ok(characteristics(0)),
            interrupt_after: Some(op.interrupter().clone()),
        });
        let h = harness(keys, StubDistributionAnalyzer::returning(Ok(distribution())));

        let err = h
            .orchestrator
            .run(&op, &request("db.orders"), &DeploymentContext::replica_set())
            .await
            .unwrap_err();

        assert_eq!(err, DbError::Interrupted);
        assert_eq!(h.key_calls(), 1);
        assert_eq!(h.distribution_calls(), 0);
    }
}
