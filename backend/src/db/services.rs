//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers. Validation,
//! list caps, server-side timestamps and the aggregation calls live here so
//! every storage backend behaves the same.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers                                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - input validation, caps, timestamps                   │
//! │  - crop statistics via services::aggregation            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Local Repository │     │ Fallback Repository     │
//! │ (live, in-memory)│     │ (static, read-only)     │
//! └──────────────────┘     └─────────────────────────┘
//! ```

use chrono::Utc;
use log::debug;

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    Buyer, BuyerId, Chat, Crop, FarmFilter, FarmId, FarmRecord, FarmUpdate, NewBuyer, NewFarm,
    NewMessage, NewPurchase, NewReview,
};
use crate::routes::crops::{
    AvailabilityEntry, CropSummary, HeatPoint, TopStates, CROP_LIST_LIMIT, DEFAULT_TOP_STATES,
};
use crate::routes::farms::FARM_LIST_LIMIT;
use crate::services::aggregation;

fn invalid(operation: &str, entity: &str, message: String) -> RepositoryError {
    RepositoryError::validation_with_context(
        message,
        ErrorContext::new(operation).with_entity(entity),
    )
}

// ==================== Health ====================

/// Pass-through to the repository's health check.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Farms ====================

/// Farms matching `filter`, capped at [`FARM_LIST_LIMIT`].
pub async fn list_farms<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &FarmFilter,
) -> RepositoryResult<Vec<FarmRecord>> {
    let farms = repo.list_farms(filter, Some(FARM_LIST_LIMIT)).await?;
    debug!("list_farms matched {} farms", farms.len());
    Ok(farms)
}

pub async fn get_farm<R: FullRepository + ?Sized>(
    repo: &R,
    id: &FarmId,
) -> RepositoryResult<FarmRecord> {
    repo.get_farm(id).await
}

/// Farms in `state` (exact match).
pub async fn farms_by_state<R: FullRepository + ?Sized>(
    repo: &R,
    state: &str,
) -> RepositoryResult<Vec<FarmRecord>> {
    repo.list_farms(&FarmFilter::new().state(state), None).await
}

/// Farms growing `crop_type` (exact match).
pub async fn farms_by_crop<R: FullRepository + ?Sized>(
    repo: &R,
    crop_type: &str,
) -> RepositoryResult<Vec<FarmRecord>> {
    repo.list_farms(&FarmFilter::new().crop_type(crop_type), None)
        .await
}

/// Validate and store a new farm listing.
pub async fn create_farm<R: FullRepository + ?Sized>(
    repo: &R,
    farm: NewFarm,
) -> RepositoryResult<FarmRecord> {
    farm.validate()
        .map_err(|msg| invalid("create_farm", "farm", msg))?;
    repo.create_farm(farm.into_record()).await
}

pub async fn update_farm<R: FullRepository + ?Sized>(
    repo: &R,
    id: &FarmId,
    update: FarmUpdate,
) -> RepositoryResult<FarmRecord> {
    update
        .validate()
        .map_err(|msg| invalid("update_farm", "farm", msg))?;
    repo.update_farm(id, update).await
}

/// Append a review dated now; the farm's rating becomes the mean of all reviews.
pub async fn add_review<R: FullRepository + ?Sized>(
    repo: &R,
    id: &FarmId,
    review: NewReview,
) -> RepositoryResult<FarmRecord> {
    review
        .validate()
        .map_err(|msg| invalid("add_review", "farm", msg))?;
    repo.add_review(id, review.into_review(Utc::now())).await
}

// ==================== Crops ====================

/// The crop catalogue, capped at [`CROP_LIST_LIMIT`].
pub async fn list_crops<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Crop>> {
    repo.list_crops(Some(CROP_LIST_LIMIT)).await
}

pub async fn crop_stats<R: FullRepository + ?Sized>(
    repo: &R,
    crop_type: &str,
) -> RepositoryResult<CropSummary> {
    let farms = farms_by_crop(repo, crop_type).await?;
    Ok(aggregation::summarize_by_crop_type(&farms, crop_type))
}

/// Producing states for `crop_type`, largest first, truncated to `limit`
/// (default [`DEFAULT_TOP_STATES`]).
pub async fn top_states<R: FullRepository + ?Sized>(
    repo: &R,
    crop_type: &str,
    limit: Option<usize>,
) -> RepositoryResult<TopStates> {
    let summary = crop_stats(repo, crop_type).await?;
    let mut ranked = aggregation::rank_states(&summary.state_distribution);
    ranked.truncate(limit.unwrap_or(DEFAULT_TOP_STATES));
    Ok(ranked)
}

pub async fn crop_availability<R: FullRepository + ?Sized>(
    repo: &R,
    crop_type: &str,
) -> RepositoryResult<Vec<AvailabilityEntry>> {
    let farms = farms_by_crop(repo, crop_type).await?;
    Ok(aggregation::to_availability(&farms))
}

/// Heat points for every farm with coordinates.
pub async fn heatmap<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<HeatPoint>> {
    let farms = repo.list_farms(&FarmFilter::new(), None).await?;
    Ok(aggregation::to_heat_points(&farms).collect())
}

// ==================== Buyers ====================

pub async fn list_buyers<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Buyer>> {
    repo.list_buyers().await
}

/// Validate and store a buyer. Duplicate emails are rejected by the repository.
pub async fn create_buyer<R: FullRepository + ?Sized>(
    repo: &R,
    buyer: NewBuyer,
) -> RepositoryResult<Buyer> {
    buyer
        .validate()
        .map_err(|msg| invalid("create_buyer", "buyer", msg))?;
    repo.create_buyer(buyer.into_buyer(Utc::now())).await
}

pub async fn get_buyer<R: FullRepository + ?Sized>(
    repo: &R,
    id: &BuyerId,
) -> RepositoryResult<Buyer> {
    repo.get_buyer(id).await
}

/// Append a purchase dated now.
pub async fn add_purchase<R: FullRepository + ?Sized>(
    repo: &R,
    id: &BuyerId,
    purchase: NewPurchase,
) -> RepositoryResult<Buyer> {
    repo.add_purchase(id, purchase.into_purchase(Utc::now()))
        .await
}

// ==================== Chat ====================

pub async fn get_chat<R: FullRepository + ?Sized>(
    repo: &R,
    buyer_id: &str,
    farm_id: &str,
) -> RepositoryResult<Chat> {
    repo.get_or_create_chat(buyer_id, farm_id).await
}

/// Append a message stamped with the server time.
pub async fn send_message<R: FullRepository + ?Sized>(
    repo: &R,
    buyer_id: &str,
    farm_id: &str,
    message: NewMessage,
) -> RepositoryResult<Chat> {
    message
        .validate()
        .map_err(|msg| invalid("send_message", "chat", msg))?;
    repo.append_message(buyer_id, farm_id, message.sender, message.message, Utc::now())
        .await
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
