// ============================================================================
// analyze-shard-key
// ============================================================================
//
// Evaluates a candidate shard key for a collection before it is sharded:
// validates the deployment and target collection, then composes the key
// characteristics and read/write distribution analyses into one response.

pub mod analysis;
pub mod command;
pub mod connection;
pub mod core;
pub mod facade;
pub mod server;
pub mod storage;

// Re-export main types for convenience
pub use analysis::{
    AnalysisToggles, AnalyzeShardKeyRequest, AnalyzeShardKeyResponse, CatalogValidator,
    FixtureAnalyzers, FixtureFile, KeyCharacteristicsAnalyzer, NamespaceValidator,
    ORPHAN_DOCS_WARNING, ReadWriteDistributionAnalyzer, ShardKeyAnalysisOrchestrator,
};
pub use command::{Command, CommandContext, CommandRegistry};
pub use connection::{
    Interrupter, OperationContext,
    auth::{ActionType, AuthManager, Privilege, ResourcePattern, User},
    config::{AnalysisParameters, FeatureFlags, ServerConfig},
};
pub use crate::core::{
    ClusterRole, CollectionUuid, DbError, DeploymentContext, KeyCharacteristicsMetrics,
    Namespace, ReadDistributionMetrics, Result, ShardKeyPattern, WriteDistributionMetrics,
};
pub use facade::ShardKeyAdvisor;
pub use storage::{Catalog, CatalogHandle, CollectionOptions};

/// Builds an advisor whose analyzers serve metrics from `fixture`.
///
/// # Examples
///
/// ```no_run
/// use analyze_shard_key::{FixtureFile, ServerConfig, fixture_advisor};
///
/// # async fn demo() -> analyze_shard_key::Result<()> {
/// let config = ServerConfig::from_json_file("server.json")?;
/// let fixture = FixtureFile::from_json_file("fixture.json")?;
/// let advisor = fixture_advisor(config, fixture).await?;
///
/// let reply = advisor
///     .run_command(
///         "admin",
///         "adminpass",
///         "admin",
///         &serde_json::json!({"analyzeShardKey": "db.orders", "key": {"customerId": 1}}),
///     )
///     .await;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub async fn fixture_advisor(config: ServerConfig, fixture: FixtureFile) -> Result<ShardKeyAdvisor> {
    let catalog = CatalogHandle::default();
    let analyzers = std::sync::Arc::new(FixtureAnalyzers::install(catalog.clone(), fixture)?);
    ShardKeyAdvisor::new(config, catalog, analyzers.clone(), analyzers).await
}
