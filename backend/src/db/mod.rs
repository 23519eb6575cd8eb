//! Document storage for farms, crops, buyers and chats.
//!
//! Storage sits behind the Repository pattern so the live store and the
//! static fallback dataset are interchangeable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API)                           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ LocalRepository  │     │ FallbackRepository      │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! There is no process-wide repository. The HTTP state owns both
//! implementations and picks one per request.
//!
//! # Recommended Usage
//!
//! ```ignore
//! use kisaan_mandi::db::{services, RepositoryFactory};
//!
//! let repo = RepositoryFactory::from_env()?;
//! let farms = services::list_farms(repo.as_ref(), &FarmFilter::new()).await?;
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable the local-repo feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use repo_config::{LocalSettings, RepositoryConfig};

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::{FallbackRepository, LocalRepository};
pub use repository::{
    BuyerRepository, ChatRepository, CropRepository, ErrorContext, FarmRepository,
    FullRepository, RepositoryError, RepositoryResult,
};
