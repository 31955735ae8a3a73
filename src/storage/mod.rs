pub mod catalog;

pub use catalog::{Catalog, CatalogHandle, CollectionEntry, CollectionOptions, ViewDefinition};
