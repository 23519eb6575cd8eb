//! Static, read-only dataset served while the live store is unavailable.
//!
//! Farm and crop reads answer from a fixed snapshot. Every write, and every
//! buyer or chat operation, fails with a connection error so callers report
//! `Database not connected` instead of silently dropping data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    Buyer, BuyerId, Chat, ChatSender, Crop, FarmFilter, FarmId, FarmRecord, FarmUpdate, Purchase,
    QualityReview,
};
use crate::services::{aggregation, seed};

#[derive(Clone)]
pub struct FallbackRepository {
    farms: Arc<Vec<FarmRecord>>,
    crops: Arc<Vec<Crop>>,
}

impl FallbackRepository {
    /// Serve `farms`, with the crop catalogue derived from them.
    pub fn new(farms: Vec<FarmRecord>) -> Self {
        let crops = aggregation::build_crop_catalogue(&farms);
        Self {
            farms: Arc::new(farms),
            crops: Arc::new(crops),
        }
    }

    pub fn farms(&self) -> &[FarmRecord] {
        &self.farms
    }

    fn read_only(operation: &str) -> RepositoryError {
        RepositoryError::connection_with_context(
            "Database not connected",
            ErrorContext::new(operation).with_details("fallback dataset is read-only"),
        )
    }
}

impl Default for FallbackRepository {
    /// The deterministic built-in dataset.
    fn default() -> Self {
        Self::new(seed::fallback_dataset())
    }
}

#[async_trait]
impl FarmRepository for FallbackRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn list_farms(
        &self,
        filter: &FarmFilter,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<FarmRecord>> {
        Ok(self
            .farms
            .iter()
            .filter(|f| aggregation::matches(f, filter))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count_farms(&self) -> RepositoryResult<usize> {
        Ok(self.farms.len())
    }

    async fn get_farm(&self, id: &FarmId) -> RepositoryResult<FarmRecord> {
        self.farms
            .iter()
            .find(|f| &f.id == id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Farm not found",
                    ErrorContext::new("get_farm")
                        .with_entity("farm")
                        .with_entity_id(id),
                )
            })
    }

    async fn create_farm(&self, _farm: FarmRecord) -> RepositoryResult<FarmRecord> {
        Err(Self::read_only("create_farm"))
    }

    async fn insert_farms(&self, _farms: Vec<FarmRecord>) -> RepositoryResult<usize> {
        Err(Self::read_only("insert_farms"))
    }

    async fn update_farm(&self, _id: &FarmId, _update: FarmUpdate) -> RepositoryResult<FarmRecord> {
        Err(Self::read_only("update_farm"))
    }

    async fn add_review(&self, _id: &FarmId, _review: QualityReview) -> RepositoryResult<FarmRecord> {
        Err(Self::read_only("add_review"))
    }
}

#[async_trait]
impl CropRepository for FallbackRepository {
    async fn list_crops(&self, limit: Option<usize>) -> RepositoryResult<Vec<Crop>> {
        Ok(self
            .crops
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn insert_crops(&self, _crops: Vec<Crop>) -> RepositoryResult<usize> {
        Err(Self::read_only("insert_crops"))
    }
}

#[async_trait]
impl BuyerRepository for FallbackRepository {
    async fn list_buyers(&self) -> RepositoryResult<Vec<Buyer>> {
        Err(Self::read_only("list_buyers"))
    }

    async fn create_buyer(&self, _buyer: Buyer) -> RepositoryResult<Buyer> {
        Err(Self::read_only("create_buyer"))
    }

    async fn get_buyer(&self, _id: &BuyerId) -> RepositoryResult<Buyer> {
        Err(Self::read_only("get_buyer"))
    }

    async fn add_purchase(&self, _id: &BuyerId, _purchase: Purchase) -> RepositoryResult<Buyer> {
        Err(Self::read_only("add_purchase"))
    }
}

#[async_trait]
impl ChatRepository for FallbackRepository {
    async fn get_or_create_chat(&self, _buyer_id: &str, _farm_id: &str) -> RepositoryResult<Chat> {
        Err(Self::read_only("get_or_create_chat"))
    }

    async fn append_message(
        &self,
        _buyer_id: &str,
        _farm_id: &str,
        _sender: ChatSender,
        _message: String,
        _now: DateTime<Utc>,
    ) -> RepositoryResult<Chat> {
        Err(Self::read_only("append_message"))
    }
}
