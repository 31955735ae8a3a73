//! Analyzers that serve pre-recorded metrics from a JSON fixture.
//!
//! Used by the binary and by tests to exercise the full command path without
//! a statistics engine. Each call still honours the interrupt and
//! collection-identity obligations of the analyzer traits.

use super::analyzer::{KeyCharacteristicsAnalyzer, ReadWriteDistributionAnalyzer};
use crate::connection::OperationContext;
use crate::core::{
    CollectionUuid, DbError, KeyCharacteristicsMetrics, Namespace, ReadDistributionMetrics,
    Result, ShardKeyPattern, WriteDistributionMetrics,
};
use crate::storage::{CatalogHandle, CollectionOptions, ViewDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FixtureCollectionKind {
    #[default]
    Collection,
    View,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FixtureCollection {
    pub namespace: Namespace,
    #[serde(default)]
    pub kind: FixtureCollectionKind,
    #[serde(default)]
    pub encrypted: bool,
    /// Source collection, for views.
    #[serde(default)]
    pub view_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FixtureMetrics {
    pub namespace: Namespace,
    pub key: ShardKeyPattern,
    #[serde(default)]
    pub key_characteristics: Option<KeyCharacteristicsMetrics>,
    #[serde(default)]
    pub read_distribution: Option<ReadDistributionMetrics>,
    #[serde(default)]
    pub write_distribution: Option<WriteDistributionMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FixtureFile {
    #[serde(default)]
    pub collections: Vec<FixtureCollection>,
    #[serde(default)]
    pub metrics: Vec<FixtureMetrics>,
}

impl FixtureFile {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

pub struct FixtureAnalyzers {
    catalog: CatalogHandle,
    metrics: HashMap<(Namespace, ShardKeyPattern), FixtureMetrics>,
}

impl FixtureAnalyzers {
    /// Registers the fixture's collections in `catalog` and indexes its metrics.
    pub fn install(catalog: CatalogHandle, fixture: FixtureFile) -> Result<Self> {
        for collection in fixture.collections {
            match collection.kind {
                FixtureCollectionKind::Collection => {
                    catalog.create_collection(
                        collection.namespace,
                        CollectionOptions {
                            encrypted_fields: collection.encrypted,
                        },
                    )?;
                }
                FixtureCollectionKind::View => {
                    let view_on = collection.view_on.ok_or_else(|| {
                        DbError::BadValue(format!(
                            "view {} in fixture is missing 'viewOn'",
                            collection.namespace
                        ))
                    })?;
                    catalog.create_view(
                        collection.namespace,
                        ViewDefinition {
                            view_on,
                            pipeline: Vec::new(),
                        },
                    )?;
                }
            }
        }

        let mut metrics = HashMap::with_capacity(fixture.metrics.len());
        for entry in fixture.metrics {
            let slot = (entry.namespace.clone(), entry.key.clone());
            if metrics.insert(slot, entry).is_some() {
                return Err(DbError::BadValue("duplicate metrics entry in fixture".into()));
            }
        }

        Ok(Self { catalog, metrics })
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    fn check_pinned(&self, op: &OperationContext, nss: &Namespace, expected: CollectionUuid) -> Result<()> {
        op.check_for_interrupt()?;

        let catalog = self.catalog.snapshot()?;
        match catalog.lookup_collection(nss) {
            Some(entry) if entry.uuid == expected => Ok(()),
            Some(entry) => Err(DbError::CollectionUuidMismatch(format!(
                "Collection {nss} has UUID {} but the analysis was started against {expected}",
                entry.uuid
            ))),
            None => Err(DbError::CollectionUuidMismatch(format!(
                "Collection {nss} with UUID {expected} no longer exists"
            ))),
        }
    }

    fn lookup(&self, nss: &Namespace, key: &ShardKeyPattern) -> Option<&FixtureMetrics> {
        self.metrics.get(&(nss.clone(), key.clone()))
    }
}

#[async_trait]
impl KeyCharacteristicsAnalyzer for FixtureAnalyzers {
    async fn analyze(
        &self,
        op: &OperationContext,
        nss: &Namespace,
        collection_uuid: CollectionUuid,
        key: &ShardKeyPattern,
    ) -> Result<KeyCharacteristicsMetrics> {
        self.check_pinned(op, nss, collection_uuid)?;

        self.lookup(nss, key)
            .and_then(|entry| entry.key_characteristics.clone())
            .ok_or_else(|| {
                DbError::IllegalOperation(
                    "Cannot analyze the characteristics of a shard key that does not have a supporting index."
                        .into(),
                )
            })
    }
}

#[async_trait]
impl ReadWriteDistributionAnalyzer for FixtureAnalyzers {
    async fn analyze(
        &self,
        op: &OperationContext,
        nss: &Namespace,
        collection_uuid: CollectionUuid,
        key: &ShardKeyPattern,
    ) -> Result<(ReadDistributionMetrics, WriteDistributionMetrics)> {
        self.check_pinned(op, nss, collection_uuid)?;

        // No sampled queries recorded means zero-sized samples, not an error.
        let entry = self.lookup(nss, key);
        let read = entry
            .and_then(|e| e.read_distribution.clone())
            .unwrap_or_default();
        let write = entry
            .and_then(|e| e.write_distribution.clone())
            .unwrap_or_default();
        Ok((read, write))
    }
}
