//! Chat repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{Chat, ChatSender};

/// Repository trait for buyer/farmer conversations.
///
/// A (buyer, farm) pair identifies at most one chat.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Return the chat for the pair, creating an empty one if none exists.
    async fn get_or_create_chat(&self, buyer_id: &str, farm_id: &str) -> RepositoryResult<Chat>;

    /// Append a message, creating the chat first if needed. Bumps `updated_at` to `now`.
    async fn append_message(
        &self,
        buyer_id: &str,
        farm_id: &str,
        sender: ChatSender,
        message: String,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Chat>;
}
