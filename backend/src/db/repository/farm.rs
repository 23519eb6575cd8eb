//! Farm repository trait.
//!
//! Farm listings are the primary document type: every crop statistic, heatmap
//! and availability view is derived from them.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{FarmFilter, FarmId, FarmRecord, FarmUpdate, QualityReview};

/// Repository trait for farm listings.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait FarmRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` - The store can serve reads and writes
    /// * `Ok(false)` - The store is up but should not be used
    /// * `Err(RepositoryError)` - The check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List farms matching `filter`, in storage order.
    ///
    /// # Arguments
    /// * `filter` - Constraints to apply; an empty filter matches every farm
    /// * `limit` - Maximum number of farms to return, if any
    ///
    /// # Returns
    /// * `Ok(Vec<FarmRecord>)` - Matching farms, cloned out of the store
    /// * `Err(RepositoryError)` - If the store cannot be read
    async fn list_farms(
        &self,
        filter: &FarmFilter,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<FarmRecord>>;

    /// Number of stored farms.
    async fn count_farms(&self) -> RepositoryResult<usize>;

    /// Fetch one farm.
    ///
    /// # Returns
    /// * `Ok(FarmRecord)` - The farm
    /// * `Err(RepositoryError::NotFound)` - If no farm has this id
    async fn get_farm(&self, id: &FarmId) -> RepositoryResult<FarmRecord>;

    /// Store a new farm and return it as stored.
    async fn create_farm(&self, farm: FarmRecord) -> RepositoryResult<FarmRecord>;

    /// Bulk insert, used by seeding. Returns the number of farms inserted.
    ///
    /// Like `create_farm`, an id that is already stored (or repeated within
    /// the batch) is a validation error and nothing is inserted.
    async fn insert_farms(&self, farms: Vec<FarmRecord>) -> RepositoryResult<usize>;

    /// Apply a partial update.
    ///
    /// # Arguments
    /// * `id` - The farm to update
    /// * `update` - Fields to overwrite; absent fields are left unchanged
    ///
    /// # Returns
    /// * `Ok(FarmRecord)` - The farm after the update
    /// * `Err(RepositoryError::NotFound)` - If no farm has this id
    /// * `Err(RepositoryError::ValidationError)` - If the update is out of range
    async fn update_farm(&self, id: &FarmId, update: FarmUpdate) -> RepositoryResult<FarmRecord>;

    /// Append a review and recompute the farm's mean quality rating.
    async fn add_review(&self, id: &FarmId, review: QualityReview) -> RepositoryResult<FarmRecord>;
}
