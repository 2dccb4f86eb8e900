//! Trait and types for the open-data catalog hosting the discovery documents.

use anyhow::Result;

/// A resource listed under the catalog dataset.
#[derive(Debug, Clone)]
pub struct ResourceRef {
    pub id: String,
    pub name: String,
    /// Datastore-backed resources are tabular API tables, not the plain
    /// JSON files the discovery documents live in.
    pub datastore_active: bool,
}

/// Resolved detail for a single resource: display name and payload URL.
#[derive(Debug, Clone)]
pub struct ResourceDetail {
    pub name: String,
    pub url: String,
}

/// Abstraction over a metadata catalog provider (e.g. a CKAN portal).
#[async_trait::async_trait]
pub trait CatalogApi {
    /// Lists the resources attached to a dataset.
    async fn package_resources(&self, dataset_id: &str) -> Result<Vec<ResourceRef>>;

    /// Resolves one resource to its name and file URL.
    async fn resource_detail(&self, resource_id: &str) -> Result<ResourceDetail>;
}
