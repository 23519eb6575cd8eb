//! Buyer repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Buyer, BuyerId, Purchase};

/// Repository trait for buyer profiles and purchase history.
#[async_trait]
pub trait BuyerRepository: Send + Sync {
    async fn list_buyers(&self) -> RepositoryResult<Vec<Buyer>>;

    /// Store a new buyer.
    ///
    /// # Returns
    /// * `Ok(Buyer)` - The stored buyer
    /// * `Err(RepositoryError::ValidationError)` - If another buyer already uses the email
    async fn create_buyer(&self, buyer: Buyer) -> RepositoryResult<Buyer>;

    async fn get_buyer(&self, id: &BuyerId) -> RepositoryResult<Buyer>;

    /// Append a purchase to the buyer's history.
    async fn add_purchase(&self, id: &BuyerId, purchase: Purchase) -> RepositoryResult<Buyer>;
}
