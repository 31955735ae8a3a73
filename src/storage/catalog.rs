use crate::core::{CollectionUuid, DbError, Namespace, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Catalog entry for a real collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    pub uuid: CollectionUuid,
    pub options: CollectionOptions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOptions {
    /// Queryable encryption configuration is present.
    #[serde(default)]
    pub encrypted_fields: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub view_on: String,
    #[serde(default)]
    pub pipeline: Vec<Value>,
}

/// Collection and view metadata.
///
/// Immutable once built; mutations return a new catalog so readers can keep a
/// consistent snapshot without holding a lock.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    collections: Arc<HashMap<Namespace, CollectionEntry>>,
    views: Arc<HashMap<Namespace, ViewDefinition>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection with a freshly generated UUID.
    pub fn with_collection(self, nss: Namespace, options: CollectionOptions) -> Result<Self> {
        if self.collections.contains_key(&nss) || self.views.contains_key(&nss) {
            return Err(DbError::NamespaceExists(nss.to_string()));
        }

        let mut collections = (*self.collections).clone();
        collections.insert(
            nss,
            CollectionEntry {
                uuid: CollectionUuid::generate(),
                options,
            },
        );

        Ok(Self {
            collections: Arc::new(collections),
            views: self.views,
        })
    }

    pub fn with_view(self, nss: Namespace, definition: ViewDefinition) -> Result<Self> {
        if self.collections.contains_key(&nss) || self.views.contains_key(&nss) {
            return Err(DbError::NamespaceExists(nss.to_string()));
        }

        let mut views = (*self.views).clone();
        views.insert(nss, definition);

        Ok(Self {
            collections: self.collections,
            views: Arc::new(views),
        })
    }

    pub fn without_collection(self, nss: &Namespace) -> Result<Self> {
        if !self.collections.contains_key(nss) {
            return Err(DbError::NamespaceNotFound(format!("ns not found: {nss}")));
        }

        let mut collections = (*self.collections).clone();
        collections.remove(nss);

        Ok(Self {
            collections: Arc::new(collections),
            views: self.views,
        })
    }

    pub fn lookup_collection(&self, nss: &Namespace) -> Option<&CollectionEntry> {
        self.collections.get(nss)
    }

    pub fn lookup_view(&self, nss: &Namespace) -> Option<&ViewDefinition> {
        self.views.get(nss)
    }
}

/// Shared, swappable catalog. Readers take cheap snapshots.
#[derive(Clone, Debug, Default)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Result<Catalog> {
        Ok(self.inner.read()?.clone())
    }

    /// Applies a copy-on-write change atomically with respect to other writers.
    pub fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(Catalog) -> Result<Catalog>,
    {
        let mut guard = self.inner.write()?;
        let next = change(guard.clone())?;
        *guard = next;
        Ok(())
    }

    pub fn create_collection(&self, nss: Namespace, options: CollectionOptions) -> Result<CollectionUuid> {
        self.update(|catalog| catalog.with_collection(nss.clone(), options))?;
        self.snapshot()?
            .lookup_collection(&nss)
            .map(|entry| entry.uuid)
            .ok_or_else(|| DbError::InternalError(format!("collection {nss} vanished after creation")))
    }

    pub fn create_view(&self, nss: Namespace, definition: ViewDefinition) -> Result<()> {
        self.update(|catalog| catalog.with_view(nss, definition))
    }

    pub fn drop_collection(&self, nss: &Namespace) -> Result<()> {
        self.update(|catalog| catalog.without_collection(nss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nss(raw: &str) -> Namespace {
        Namespace::parse(raw).unwrap()
    }

    #[test]
    fn test_with_collection_is_copy_on_write() {
        let empty = Catalog::new();
        let with_orders = empty
            .clone()
            .with_collection(nss("db.orders"), CollectionOptions::default())
            .unwrap();

        assert!(empty.lookup_collection(&nss("db.orders")).is_none());
        assert!(with_orders.lookup_collection(&nss("db.orders")).is_some());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let catalog = Catalog::new()
            .with_collection(nss("db.orders"), CollectionOptions::default())
            .unwrap();
        let err = catalog
            .clone()
            .with_view(
                nss("db.orders"),
                ViewDefinition {
                    view_on: "other".into(),
                    pipeline: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err, DbError::NamespaceExists(_)));
    }

    #[test]
    fn test_recreate_assigns_new_uuid() {
        let handle = CatalogHandle::default();
        let first = handle
            .create_collection(nss("db.orders"), CollectionOptions::default())
            .unwrap();
        handle.drop_collection(&nss("db.orders")).unwrap();
        let second = handle
            .create_collection(nss("db.orders"), CollectionOptions::default())
            .unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let handle = CatalogHandle::default();
        handle
            .create_collection(nss("db.orders"), CollectionOptions::default())
            .unwrap();

        let before = handle.snapshot().unwrap();
        handle.drop_collection(&nss("db.orders")).unwrap();

        assert!(before.lookup_collection(&nss("db.orders")).is_some());
        assert!(handle.snapshot().unwrap().lookup_collection(&nss("db.orders")).is_none());
    }

    #[test]
    fn test_failed_update_leaves_catalog_untouched() {
        let handle = CatalogHandle::default();
        let err = handle.drop_collection(&nss("db.missing")).unwrap_err();
        assert!(matches!(err, DbError::NamespaceNotFound(_)));
        assert!(handle.snapshot().unwrap().lookup_collection(&nss("db.missing")).is_none());
    }
}
