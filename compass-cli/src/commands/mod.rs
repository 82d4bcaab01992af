pub mod catalog;
pub mod config;
pub mod progress;
pub mod serve;
pub mod token;
pub mod user;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use compass_core::SqliteStore;

use crate::config::CompassConfig;

/// Database selection shared by commands that touch the store
#[derive(Debug, Clone, Args, Default)]
pub struct StoreArgs {
    /// SQLite database file (overrides [database] path)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,
}

impl StoreArgs {
    pub fn path(&self, config: &CompassConfig) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| config.database.path.clone())
    }

    /// Open (creating and migrating if needed) the configured database
    pub fn open(&self, config: &CompassConfig) -> Result<Arc<SqliteStore>> {
        let path = self.path(config);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let store = SqliteStore::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_config_path() {
        let config = CompassConfig::default();
        let args = StoreArgs {
            database: Some(PathBuf::from("/tmp/other.db")),
        };
        assert_eq!(args.path(&config), PathBuf::from("/tmp/other.db"));
        assert_eq!(StoreArgs::default().path(&config), config.database.path);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = StoreArgs {
            database: Some(dir.path().join("nested/data/compass.db")),
        };
        args.open(&CompassConfig::default()).unwrap();
        assert!(dir.path().join("nested/data/compass.db").exists());
    }
}
