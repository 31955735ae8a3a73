use crate::connection::OperationContext;
use crate::core::{
    CollectionUuid, KeyCharacteristicsMetrics, Namespace, ReadDistributionMetrics, Result,
    ShardKeyPattern, WriteDistributionMetrics,
};
use async_trait::async_trait;

/// Computes cardinality, frequency and orphan statistics for a candidate key.
///
/// Implementations must fail with `CollectionUuidMismatch` if the collection
/// they read is not the instance identified by `collection_uuid`, and should
/// poll [`OperationContext::check_for_interrupt`] while working.
#[async_trait]
pub trait KeyCharacteristicsAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        op: &OperationContext,
        nss: &Namespace,
        collection_uuid: CollectionUuid,
        key: &ShardKeyPattern,
    ) -> Result<KeyCharacteristicsMetrics>;
}

/// Computes read and write routing statistics from sampled queries.
///
/// Never called on multi-tenant deployments. Same identity and interrupt
/// obligations as [`KeyCharacteristicsAnalyzer`].
#[async_trait]
pub trait ReadWriteDistributionAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        op: &OperationContext,
        nss: &Namespace,
        collection_uuid: CollectionUuid,
        key: &ShardKeyPattern,
    ) -> Result<(ReadDistributionMetrics, WriteDistributionMetrics)>;
}
