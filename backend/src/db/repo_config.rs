//! Repository configuration file support.
//!
//! Reads `repository.toml`:
//!
//! ```toml
//! [repository]
//! type = "local"          # or "fallback"
//!
//! [local]
//! data_file = "data/kisaan.json"
//! seed = true
//! seed_farm_count = 200
//! rng_seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Farms generated when seeding an empty store.
pub const DEFAULT_SEED_FARM_COUNT: usize = 200;

/// Repository configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub local: LocalSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: "local".to_string(),
        }
    }
}

/// Settings for the in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    /// JSON snapshot path; memory-only when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Seed synthetic farms when the store is empty.
    #[serde(default = "default_seed")]
    pub seed: bool,
    #[serde(default = "default_seed_farm_count")]
    pub seed_farm_count: usize,
    /// Fixed RNG seed for reproducible seeding.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_seed() -> bool {
    true
}

fn default_seed_farm_count() -> usize {
    DEFAULT_SEED_FARM_COUNT
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            data_file: None,
            seed: default_seed(),
            seed_farm_count: default_seed_farm_count(),
            rng_seed: None,
        }
    }
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"

[local]
data_file = "data/kisaan.json"
seed = false
seed_farm_count = 50
rng_seed = 42
"#;

        let config = RepositoryConfig::from_toml(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert_eq!(
            config.local.data_file.as_deref(),
            Some(Path::new("data/kisaan.json"))
        );
        assert!(!config.local.seed);
        assert_eq!(config.local.seed_farm_count, 50);
        assert_eq!(config.local.rng_seed, Some(42));
    }

    #[test]
    fn test_local_section_is_optional() {
        let config = RepositoryConfig::from_toml("[repository]\ntype = \"fallback\"\n").unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Fallback);
        assert_eq!(config.local, LocalSettings::default());
        assert!(config.local.seed);
        assert_eq!(config.local.seed_farm_count, DEFAULT_SEED_FARM_COUNT);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let config = RepositoryConfig::from_toml("[repository]\ntype = \"mongo\"\n").unwrap();
        assert!(config.repository_type().is_err());
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let err = RepositoryConfig::from_toml("[repository\n").unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }
}
