//! Configuration store port interface

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for persistent configuration storage
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the stored config, or an empty config when none exists
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Persist the given config
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Path of the backing file
    fn path(&self) -> PathBuf;

    /// Whether the backing file exists
    fn exists(&self) -> bool;

    /// Create the backing file with defaults; fails if it already exists
    async fn init(&self) -> Result<(), ConfigError>;
}
