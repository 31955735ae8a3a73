pub mod deployment;
pub mod error;
pub mod metrics;
pub mod types;

pub use deployment::{ClusterRole, DeploymentContext};
pub use error::{DbError, Result};
pub use metrics::{
    KeyCharacteristicsMetrics, MonotonicityMetrics, MonotonicityType, ReadDistributionMetrics,
    ReadSampleSize, ValueFrequency, WriteDistributionMetrics, WriteSampleSize,
};
pub use types::{CollectionUuid, KeyField, KeyFieldKind, Namespace, ShardKeyPattern};
