//! Metric records produced by the analyzers.
//!
//! The orchestrator treats these as opaque payloads; the only field it reads is
//! [`KeyCharacteristicsMetrics::num_orphan_docs`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFrequency {
    pub value: Value,
    pub frequency: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MonotonicityType {
    #[serde(rename = "monotonic")]
    Monotonic,
    #[serde(rename = "not monotonic")]
    NotMonotonic,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonotonicityMetrics {
    #[serde(rename = "type")]
    pub kind: MonotonicityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id_correlation_coefficient: Option<f64>,
}

/// Cardinality, frequency and monotonicity of a candidate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyCharacteristicsMetrics {
    pub num_docs: i64,
    pub is_unique: bool,
    pub num_distinct_values: i64,
    #[serde(default)]
    pub most_common_values: Vec<ValueFrequency>,
    #[serde(default)]
    pub monotonicity: MonotonicityMetrics,
    pub avg_doc_size_bytes: i64,
    /// Documents present locally but not owned by any current chunk range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_orphan_docs: Option<i64>,
}

impl KeyCharacteristicsMetrics {
    pub fn has_orphan_docs(&self) -> bool {
        self.num_orphan_docs.is_some_and(|n| n != 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReadSampleSize {
    pub total: i64,
    pub find: i64,
    pub aggregate: i64,
    pub count: i64,
    pub distinct: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReadDistributionMetrics {
    pub sample_size: ReadSampleSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_single_shard_reads: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_multi_shard_reads: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_scatter_gather_reads: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_reads_by_range: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WriteSampleSize {
    pub total: i64,
    pub update: i64,
    pub delete: i64,
    pub find_and_modify: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WriteDistributionMetrics {
    pub sample_size: WriteSampleSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_single_shard_writes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_multi_shard_writes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_scatter_gather_writes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_writes_by_range: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_shard_key_updates: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_single_writes_without_shard_key: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of_multi_writes_without_shard_key: Option<f64>,
}
