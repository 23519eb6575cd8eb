//! Crop catalogue repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Crop;

/// Repository trait for the derived crop catalogue.
#[async_trait]
pub trait CropRepository: Send + Sync {
    /// Catalogue entries in storage order, up to `limit`.
    async fn list_crops(&self, limit: Option<usize>) -> RepositoryResult<Vec<Crop>>;

    /// Bulk insert. Returns the number of entries inserted.
    async fn insert_crops(&self, crops: Vec<Crop>) -> RepositoryResult<usize>;
}
