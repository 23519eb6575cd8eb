//! In-memory document store.
//!
//! This is the live store behind the server. All documents live in memory
//! behind a `parking_lot::RwLock`; readers receive cloned snapshots so no lock
//! outlives a call. When constructed with a snapshot path, every successful
//! write is persisted to that JSON file and the file is loaded on startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    Buyer, BuyerId, Chat, ChatSender, Crop, FarmFilter, FarmId, FarmRecord, FarmUpdate, Purchase,
    QualityReview,
};
use crate::services::aggregation;

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same underlying data.
///
/// # Example
/// ```ignore
/// let repo = LocalRepository::new();
/// repo.create_farm(FarmRecord::new("f1", "Wheat")).await?;
/// assert_eq!(repo.farm_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    snapshot_path: Option<PathBuf>,
    /// Serialises snapshot writes across clones.
    persist_lock: Arc<Mutex<()>>,
}

/// Everything the store holds; also the on-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Documents {
    #[serde(default)]
    farms: Vec<FarmRecord>,
    #[serde(default)]
    crops: Vec<Crop>,
    #[serde(default)]
    buyers: Vec<Buyer>,
    #[serde(default)]
    chats: Vec<Chat>,
}

struct LocalData {
    docs: Documents,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            docs: Documents::default(),
            is_healthy: true,
        }
    }
}

const NOT_CONNECTED: &str = "Database not connected";

impl LocalRepository {
    /// Create a new empty, memory-only repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            snapshot_path: None,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a repository persisted to `path`.
    ///
    /// An existing file is loaded; a missing one is created on the first write.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let path = path.into();
        let docs = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let docs: Documents = serde_json::from_str(&raw)?;
            debug!(
                "Loaded snapshot {} ({} farms, {} buyers)",
                path.display(),
                docs.farms.len(),
                docs.buyers.len()
            );
            docs
        } else {
            Documents::default()
        };

        Ok(Self {
            data: Arc::new(RwLock::new(LocalData {
                docs,
                is_healthy: true,
            })),
            snapshot_path: Some(path),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Set the health status. An unhealthy store rejects every call with a
    /// connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all documents, keeping the health flag.
    pub fn clear(&self) {
        self.data.write().docs = Documents::default();
        self.persist();
    }

    pub fn farm_count(&self) -> usize {
        self.data.read().docs.farms.len()
    }

    pub fn buyer_count(&self) -> usize {
        self.data.read().docs.buyers.len()
    }

    pub fn chat_count(&self) -> usize {
        self.data.read().docs.chats.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection(NOT_CONNECTED));
        }
        Ok(())
    }

    /// Write the current documents to the snapshot file, if one is configured.
    ///
    /// The persist guard is held from serialisation through the rename, so a
    /// snapshot of older state never replaces a newer one. The document lock
    /// is only held while serialising. The write is blocking file I/O on the
    /// calling thread, bounded by the size of the store (a few hundred farms
    /// in practice). Failures are logged and otherwise ignored: the in-memory
    /// state stays authoritative.
    fn persist(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let _guard = self.persist_lock.lock();
        let serialized = {
            let data = self.data.read();
            serde_json::to_string_pretty(&data.docs)
        };
        let result = serialized
            .map_err(RepositoryError::from)
            .and_then(|json| write_atomically(path, &json).map_err(RepositoryError::from));
        if let Err(e) = result {
            warn!("Failed to persist snapshot {}: {}", path.display(), e);
        }
    }

    fn farm_not_found(operation: &str, id: &FarmId) -> RepositoryError {
        RepositoryError::not_found_with_context(
            "Farm not found",
            ErrorContext::new(operation)
                .with_entity("farm")
                .with_entity_id(id),
        )
    }

    fn buyer_not_found(operation: &str, id: &BuyerId) -> RepositoryError {
        RepositoryError::not_found_with_context(
            "Buyer not found",
            ErrorContext::new(operation)
                .with_entity("buyer")
                .with_entity_id(id),
        )
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

fn chat_position(chats: &[Chat], buyer_id: &str, farm_id: &str) -> Option<usize> {
    chats
        .iter()
        .position(|c| c.buyer_id == buyer_id && c.farm_id == farm_id)
}

#[async_trait]
impl FarmRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_farms(
        &self,
        filter: &FarmFilter,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<FarmRecord>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .docs
            .farms
            .iter()
            .filter(|f| aggregation::matches(f, filter))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count_farms(&self) -> RepositoryResult<usize> {
        self.check_health()?;
        Ok(self.farm_count())
    }

    async fn get_farm(&self, id: &FarmId) -> RepositoryResult<FarmRecord> {
        self.check_health()?;
        let data = self.data.read();
        data.docs
            .farms
            .iter()
            .find(|f| &f.id == id)
            .cloned()
            .ok_or_else(|| Self::farm_not_found("get_farm", id))
    }

    async fn create_farm(&self, farm: FarmRecord) -> RepositoryResult<FarmRecord> {
        self.check_health()?;
        {
            let mut data = self.data.write();
            if data.docs.farms.iter().any(|f| f.id == farm.id) {
                return Err(RepositoryError::validation_with_context(
                    format!("Farm {} already exists", farm.id),
                    ErrorContext::new("create_farm").with_entity("farm"),
                ));
            }
            data.docs.farms.push(farm.clone());
        }
        self.persist();
        Ok(farm)
    }

    async fn insert_farms(&self, farms: Vec<FarmRecord>) -> RepositoryResult<usize> {
        self.check_health()?;
        let count = farms.len();
        {
            let mut data = self.data.write();
            let mut seen: HashSet<&FarmId> = data.docs.farms.iter().map(|f| &f.id).collect();
            if let Some(dup) = farms.iter().find(|f| !seen.insert(&f.id)) {
                return Err(RepositoryError::validation_with_context(
                    format!("Farm {} already exists", dup.id),
                    ErrorContext::new("insert_farms").with_entity("farm"),
                ));
            }
            data.docs.farms.extend(farms);
        }
        self.persist();
        Ok(count)
    }

    async fn update_farm(&self, id: &FarmId, update: FarmUpdate) -> RepositoryResult<FarmRecord> {
        self.check_health()?;
        update.validate().map_err(|msg| {
            RepositoryError::validation_with_context(
                msg,
                ErrorContext::new("update_farm")
                    .with_entity("farm")
                    .with_entity_id(id),
            )
        })?;
        let updated = {
            let mut data = self.data.write();
            let farm = data
                .docs
                .farms
                .iter_mut()
                .find(|f| &f.id == id)
                .ok_or_else(|| Self::farm_not_found("update_farm", id))?;
            update.apply(farm);
            farm.clone()
        };
        self.persist();
        Ok(updated)
    }

    async fn add_review(&self, id: &FarmId, review: QualityReview) -> RepositoryResult<FarmRecord> {
        self.check_health()?;
        let updated = {
            let mut data = self.data.write();
            let farm = data
                .docs
                .farms
                .iter_mut()
                .find(|f| &f.id == id)
                .ok_or_else(|| Self::farm_not_found("add_review", id))?;
            farm.add_review(review);
            farm.clone()
        };
        self.persist();
        Ok(updated)
    }
}

#[async_trait]
impl CropRepository for LocalRepository {
    async fn list_crops(&self, limit: Option<usize>) -> RepositoryResult<Vec<Crop>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .docs
            .crops
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn insert_crops(&self, crops: Vec<Crop>) -> RepositoryResult<usize> {
        self.check_health()?;
        let count = crops.len();
        self.data.write().docs.crops.extend(crops);
        self.persist();
        Ok(count)
    }
}

#[async_trait]
impl BuyerRepository for LocalRepository {
    async fn list_buyers(&self) -> RepositoryResult<Vec<Buyer>> {
        self.check_health()?;
        Ok(self.data.read().docs.buyers.clone())
    }

    async fn create_buyer(&self, buyer: Buyer) -> RepositoryResult<Buyer> {
        self.check_health()?;
        {
            let mut data = self.data.write();
            if data
                .docs
                .buyers
                .iter()
                .any(|b| b.email.eq_ignore_ascii_case(&buyer.email))
            {
                return Err(RepositoryError::validation_with_context(
                    format!("A buyer with email {} already exists", buyer.email),
                    ErrorContext::new("create_buyer").with_entity("buyer"),
                ));
            }
            data.docs.buyers.push(buyer.clone());
        }
        self.persist();
        Ok(buyer)
    }

    async fn get_buyer(&self, id: &BuyerId) -> RepositoryResult<Buyer> {
        self.check_health()?;
        let data = self.data.read();
        data.docs
            .buyers
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| Self::buyer_not_found("get_buyer", id))
    }

    async fn add_purchase(&self, id: &BuyerId, purchase: Purchase) -> RepositoryResult<Buyer> {
        self.check_health()?;
        let updated = {
            let mut data = self.data.write();
            let buyer = data
                .docs
                .buyers
                .iter_mut()
                .find(|b| &b.id == id)
                .ok_or_else(|| Self::buyer_not_found("add_purchase", id))?;
            buyer.purchase_history.push(purchase);
            buyer.clone()
        };
        self.persist();
        Ok(updated)
    }
}

#[async_trait]
impl ChatRepository for LocalRepository {
    async fn get_or_create_chat(&self, buyer_id: &str, farm_id: &str) -> RepositoryResult<Chat> {
        self.check_health()?;
        let (chat, created) = {
            let mut data = self.data.write();
            match chat_position(&data.docs.chats, buyer_id, farm_id) {
                Some(index) => (data.docs.chats[index].clone(), false),
                None => {
                    let chat = Chat::open(buyer_id, farm_id, Utc::now());
                    data.docs.chats.push(chat.clone());
                    (chat, true)
                }
            }
        };
        if created {
            self.persist();
        }
        Ok(chat)
    }

    async fn append_message(
        &self,
        buyer_id: &str,
        farm_id: &str,
        sender: ChatSender,
        message: String,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Chat> {
        self.check_health()?;
        let chat = {
            let mut data = self.data.write();
            let chats = &mut data.docs.chats;
            let index = match chat_position(chats, buyer_id, farm_id) {
                Some(index) => index,
                None => {
                    chats.push(Chat::open(buyer_id, farm_id, now));
                    chats.len() - 1
                }
            };
            let chat = &mut chats[index];
            chat.push(sender, message, now);
            chat.clone()
        };
        self.persist();
        Ok(chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.count_farms().await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert_eq!(err.message(), "Database not connected");
    }

    #[tokio::test]
    async fn test_get_missing_farm() {
        let repo = LocalRepository::new();
        let err = repo.get_farm(&FarmId::new("nope")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(err.message(), "Farm not found");
    }

    #[tokio::test]
    async fn test_list_respects_filter_and_limit() {
        let repo = LocalRepository::new();
        let farms = (0..5)
            .map(|i| FarmRecord::new(format!("f{}", i), if i % 2 == 0 { "Wheat" } else { "Rice" }))
            .collect();
        repo.insert_farms(farms).await.unwrap();

        let wheat = repo
            .list_farms(&FarmFilter::new().crop_type("Wheat"), None)
            .await
            .unwrap();
        assert_eq!(wheat.len(), 3);

        let capped = repo.list_farms(&FarmFilter::new(), Some(2)).await.unwrap();
        let ids: Vec<&str> = capped.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f0", "f1"]);
    }

    #[tokio::test]
    async fn test_insert_farms_rejects_duplicate_ids() {
        let repo = LocalRepository::new();
        repo.create_farm(FarmRecord::new("f1", "Wheat")).await.unwrap();

        let clash = vec![FarmRecord::new("f2", "Rice"), FarmRecord::new("f1", "Rice")];
        let err = repo.insert_farms(clash).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert_eq!(repo.farm_count(), 1);

        let repeated = vec![FarmRecord::new("f3", "Rice"), FarmRecord::new("f3", "Cotton")];
        assert!(repo.insert_farms(repeated).await.is_err());
        assert_eq!(repo.farm_count(), 1);

        let fresh = vec![FarmRecord::new("f4", "Rice"), FarmRecord::new("f5", "Cotton")];
        assert_eq!(repo.insert_farms(fresh).await.unwrap(), 2);
        assert_eq!(repo.farm_count(), 3);
    }

    #[tokio::test]
    async fn test_chat_pair_is_unique() {
        let repo = LocalRepository::new();
        let first = repo.get_or_create_chat("b1", "f1").await.unwrap();
        let second = repo.get_or_create_chat("b1", "f1").await.unwrap();
        assert_eq!(first.id, second.id);
        repo.get_or_create_chat("b1", "f2").await.unwrap();
        assert_eq!(repo.chat_count(), 2);
    }
}
