//! Checks that must pass before any metric is computed.

use crate::connection::OperationContext;
use crate::core::{CollectionUuid, DbError, DeploymentContext, Namespace, Result};
use crate::storage::CatalogHandle;
use async_trait::async_trait;

pub fn validate_run_context(deployment: &DeploymentContext) -> Result<()> {
    if !deployment.replication_enabled {
        return Err(DbError::IllegalOperation(
            "analyzeShardKey command is not supported on a standalone mongod".into(),
        ));
    }
    if deployment.exclusively_has_config_role() {
        return Err(DbError::IllegalOperation(
            "analyzeShardKey command is not supported on a configsvr mongod".into(),
        ));
    }
    Ok(())
}

/// Rejects namespaces that are never analyzable, whatever the catalog holds.
pub fn validate_namespace(nss: &Namespace) -> Result<()> {
    if nss.is_on_internal_db() || nss.is_system() || nss.is_fle2_state_collection() {
        return Err(DbError::IllegalOperation(
            "Cannot run against an internal collection".into(),
        ));
    }
    Ok(())
}

/// Resolves a namespace to the identity of the collection currently behind it.
#[async_trait]
pub trait NamespaceValidator: Send + Sync {
    async fn validate(&self, op: &OperationContext, nss: &Namespace) -> Result<CollectionUuid>;
}

/// [`NamespaceValidator`] over the local catalog.
pub struct CatalogValidator {
    catalog: CatalogHandle,
}

impl CatalogValidator {
    pub fn new(catalog: CatalogHandle) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl NamespaceValidator for CatalogValidator {
    async fn validate(&self, _op: &OperationContext, nss: &Namespace) -> Result<CollectionUuid> {
        let catalog = self.catalog.snapshot()?;

        if catalog.lookup_view(nss).is_some() {
            return Err(DbError::CommandNotSupportedOnView(
                "Operation not supported for a view".into(),
            ));
        }

        let entry = catalog
            .lookup_collection(nss)
            .ok_or_else(|| DbError::NamespaceNotFound("The namespace does not exist".into()))?;

        if entry.options.encrypted_fields {
            return Err(DbError::IllegalOperation(
                "Operation not supported for a collection with queryable encryption enabled".into(),
            ));
        }

        Ok(entry.uuid)
    }
}
