pub mod analyzer;
pub mod fixture;
pub mod orchestrator;
pub mod request;
pub mod toggles;
pub mod validation;

pub use analyzer::{KeyCharacteristicsAnalyzer, ReadWriteDistributionAnalyzer};
pub use fixture::{FixtureAnalyzers, FixtureCollection, FixtureCollectionKind, FixtureFile, FixtureMetrics};
pub use orchestrator::ShardKeyAnalysisOrchestrator;
pub use request::{AnalyzeShardKeyRequest, AnalyzeShardKeyResponse, ORPHAN_DOCS_WARNING};
pub use toggles::AnalysisToggles;
pub use validation::{CatalogValidator, NamespaceValidator, validate_namespace, validate_run_context};
