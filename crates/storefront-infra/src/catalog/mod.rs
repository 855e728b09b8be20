//! Product catalog used as the suggestion source.

mod static_catalog;

pub use static_catalog::{CatalogError, Product, StaticCatalog};
