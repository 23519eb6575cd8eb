//! Repository factory for dependency injection.
//!
//! Creates repository instances from a type, the environment or
//! `repository.toml`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::{LocalSettings, RepositoryConfig};
use super::repositories::{FallbackRepository, LocalRepository};
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Live in-memory store, optionally persisted to a JSON snapshot
    Local,
    /// Static read-only dataset
    Fallback,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "fallback").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "fallback" | "static" => Ok(Self::Fallback),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Reads `REPOSITORY_TYPE`. Defaults to Local when unset or unparseable.
    pub fn from_env() -> Self {
        std::env::var("REPOSITORY_TYPE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(Self::Local)
    }
}

/// Overlay environment variables onto local-store settings.
///
/// `DATA_FILE` sets the snapshot path; an empty value clears it.
pub fn local_settings_from_env(mut settings: LocalSettings) -> LocalSettings {
    if let Ok(path) = std::env::var("DATA_FILE") {
        settings.data_file = if path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        };
    }
    settings
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use kisaan_mandi::db::{RepositoryFactory, RepositoryType};
///
/// let live = RepositoryFactory::create_local();
/// let fallback = RepositoryFactory::create(RepositoryType::Fallback, &Default::default())?;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `settings` - Local-store settings; ignored for the fallback dataset
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Shared repository instance
    /// * `Err(RepositoryError)` - If a configured snapshot cannot be loaded
    pub fn create(
        repo_type: RepositoryType,
        settings: &LocalSettings,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => match &settings.data_file {
                Some(path) => Ok(Self::create_local_with_snapshot(path)?),
                None => Ok(Self::create_local()),
            },
            RepositoryType::Fallback => Ok(Self::create_fallback()),
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a local repository persisted to `path`.
    pub fn create_local_with_snapshot<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo = LocalRepository::with_snapshot(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to load snapshot {}: {}",
                path.as_ref().display(),
                e.message()
            ))
        })?;
        Ok(Arc::new(repo))
    }

    /// Create the built-in read-only dataset.
    pub fn create_fallback() -> Arc<dyn FullRepository> {
        Arc::new(FallbackRepository::default())
    }

    /// Create repository from environment configuration
    /// (`REPOSITORY_TYPE`, `DATA_FILE`).
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let settings = local_settings_from_env(LocalSettings::default());
        Self::create(RepositoryType::from_env(), &settings)
    }

    /// Create repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from `repository.toml` in a standard location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    pub fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Self::create(repo_type, &config.local)
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```ignore
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Local)
///     .data_file("data/kisaan.json")
///     .build()?;
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    settings: LocalSettings,
}

impl RepositoryBuilder {
    /// Defaults to the type named by `REPOSITORY_TYPE`, memory-only.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            settings: LocalSettings::default(),
        }
    }

    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Persist the local store to `path`.
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.data_file = Some(path.into());
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Self {
        self.repo_type = RepositoryType::from_env();
        self.settings = local_settings_from_env(self.settings);
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(Self)` - Builder with loaded configuration
    /// * `Err(RepositoryError)` - If file cannot be read or parsed
    pub fn from_config_file<P: AsRef<Path>>(self, config_path: P) -> Result<Self, RepositoryError> {
        let config = RepositoryConfig::from_file(config_path)?;
        self.with_config(config)
    }

    /// Load configuration from `repository.toml` in a standard location.
    pub fn from_default_config(self) -> Result<Self, RepositoryError> {
        let config = RepositoryConfig::from_default_location()?;
        self.with_config(config)
    }

    fn with_config(mut self, config: RepositoryConfig) -> Result<Self, RepositoryError> {
        self.repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        self.settings = config.local;
        Ok(self)
    }

    pub fn settings(&self) -> &LocalSettings {
        &self.settings
    }

    /// Build the repository instance.
    pub fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        RepositoryFactory::create(self.repo_type, &self.settings)
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::FarmRepository;

    #[test]
    fn test_repository_type_parsing() {
        assert_eq!("local".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
        assert_eq!("LOCAL".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
        assert_eq!(
            "fallback".parse::<RepositoryType>().unwrap(),
            RepositoryType::Fallback
        );
        assert!("postgres".parse::<RepositoryType>().is_err());
    }

    #[tokio::test]
    async fn test_create_local_and_fallback() {
        let local = RepositoryFactory::create(RepositoryType::Local, &LocalSettings::default())
            .unwrap();
        assert_eq!(local.count_farms().await.unwrap(), 0);

        let fallback = RepositoryFactory::create_fallback();
        assert!(fallback.count_farms().await.unwrap() > 0);
    }
}
