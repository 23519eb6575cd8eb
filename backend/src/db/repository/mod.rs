//! Repository trait definitions.
//!
//! Storage is split across one focused trait per document type:
//!
//! - [`error`]: Error types for repository operations
//! - [`farm`]: Farm listings, reviews and health
//! - [`crop`]: The derived crop catalogue
//! - [`buyer`]: Buyer profiles and purchases
//! - [`chat`]: Buyer/farmer conversations
//!
//! For code that needs all of them, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn seed<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     if repo.count_farms().await? == 0 {
//!         repo.insert_farms(farms).await?;
//!         repo.insert_crops(crops).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod buyer;
pub mod chat;
pub mod crop;
pub mod error;
pub mod farm;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use buyer::BuyerRepository;
pub use chat::ChatRepository;
pub use crop::CropRepository;
pub use farm::FarmRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all four
/// repository traits.
pub trait FullRepository: FarmRepository + CropRepository + BuyerRepository + ChatRepository {}

impl<T> FullRepository for T where
    T: FarmRepository + CropRepository + BuyerRepository + ChatRepository
{
}
