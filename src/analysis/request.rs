use crate::core::{
    KeyCharacteristicsMetrics, Namespace, ReadDistributionMetrics, ShardKeyPattern,
    WriteDistributionMetrics,
};
use serde::{Deserialize, Serialize};

/// Advisory attached when the key characteristics saw orphaned documents.
pub const ORPHAN_DOCS_WARNING: &str = "If \"numOrphanDocs\" is large relative to \"numDocs\", you may want to rerun the command at some other time to get more accurate \"numDistinctValues\" and \"mostCommonValues\" metrics.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeShardKeyRequest {
    pub namespace: Namespace,
    pub key: ShardKeyPattern,
}

impl AnalyzeShardKeyRequest {
    pub fn new(namespace: Namespace, key: ShardKeyPattern) -> Self {
        Self { namespace, key }
    }
}

/// Best-effort composite: each section is present only if its phase ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeShardKeyResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_characteristics: Option<KeyCharacteristicsMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_distribution: Option<ReadDistributionMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_distribution: Option<WriteDistributionMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AnalyzeShardKeyResponse {
    /// Attaches the characteristics and, when orphans were seen, the advisory note.
    pub fn set_key_characteristics(&mut self, metrics: KeyCharacteristicsMetrics) {
        self.note = metrics
            .has_orphan_docs()
            .then(|| ORPHAN_DOCS_WARNING.to_string());
        self.key_characteristics = Some(metrics);
    }

    pub fn set_read_write_distribution(
        &mut self,
        read: ReadDistributionMetrics,
        write: WriteDistributionMetrics,
    ) {
        self.read_distribution = Some(read);
        self.write_distribution = Some(write);
    }
}
