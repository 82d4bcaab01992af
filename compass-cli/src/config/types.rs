use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default host for the compass server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the compass server
pub const DEFAULT_PORT: u16 = 5000;
/// Default database file name
pub const DEFAULT_DATABASE_FILE: &str = "compass.db";
/// Default bearer session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCompassConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub database: RawDatabaseConfig,

    #[serde(default)]
    pub auth: RawAuthConfig,

    #[serde(default)]
    pub engine: RawEngineConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAuthConfig {
    pub session_ttl_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawEngineConfig {
    pub batch_size: Option<usize>,
    pub prepopulation_confidence: Option<f64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompassConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub engine: EngineSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port for the compass server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of issued bearer tokens
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    /// Questions returned per batch
    pub batch_size: usize,

    /// Confidence attached to question-logic suggestions
    pub prepopulation_confidence: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            batch_size: compass_core::engine::DEFAULT_BATCH_SIZE,
            prepopulation_confidence: compass_core::engine::DEFAULT_PREPOPULATION_CONFIDENCE,
        }
    }
}

impl EngineSection {
    pub fn to_engine_config(&self) -> compass_core::EngineConfig {
        compass_core::EngineConfig::default()
            .with_batch_size(self.batch_size)
            .with_prepopulation_confidence(self.prepopulation_confidence)
    }
}
