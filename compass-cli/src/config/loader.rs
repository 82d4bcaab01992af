use super::types::{
    AuthConfig, CompassConfig, DatabaseConfig, DEFAULT_DATABASE_FILE, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SESSION_TTL_HOURS, EngineSection, RawAuthConfig, RawCompassConfig, RawDatabaseConfig,
    RawEngineConfig, RawServerConfig, ServerConfig,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Env var overriding the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "COMPASS_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<CompassConfig> {
        Self::load_layers(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Merge the given layers in order; missing files are skipped
    pub fn load_layers(user_path: Option<&Path>, project_path: &Path) -> Result<CompassConfig> {
        let mut raw = RawCompassConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    fn read_raw(path: &Path) -> Result<RawCompassConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "compass").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with COMPASS_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".compass/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCompassConfig, overlay: RawCompassConfig) -> RawCompassConfig {
        RawCompassConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            database: RawDatabaseConfig {
                path: overlay.database.path.or(base.database.path),
            },
            auth: RawAuthConfig {
                session_ttl_hours: overlay
                    .auth
                    .session_ttl_hours
                    .or(base.auth.session_ttl_hours),
            },
            engine: RawEngineConfig {
                batch_size: overlay.engine.batch_size.or(base.engine.batch_size),
                prepopulation_confidence: overlay
                    .engine
                    .prepopulation_confidence
                    .or(base.engine.prepopulation_confidence),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCompassConfig) -> CompassConfig {
        let engine_defaults = EngineSection::default();
        CompassConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            database: DatabaseConfig {
                path: raw
                    .database
                    .path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE)),
            },
            auth: AuthConfig {
                session_ttl_hours: raw
                    .auth
                    .session_ttl_hours
                    .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            },
            engine: EngineSection {
                batch_size: raw.engine.batch_size.unwrap_or(engine_defaults.batch_size),
                prepopulation_confidence: raw
                    .engine
                    .prepopulation_confidence
                    .unwrap_or(engine_defaults.prepopulation_confidence),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_layers(None, &dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.auth.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
    }

    #[test]
    fn test_project_overrides_user() {
        let dir = TempDir::new().unwrap();
        let user = write_config(
            &dir,
            "user.toml",
            "[server]\nport = 6000\nhost = \"0.0.0.0\"\n[auth]\nsession_ttl_hours = 48\n",
        );
        let project = write_config(&dir, "project.toml", "[server]\nport = 7000\n");

        let config = ConfigLoader::load_layers(Some(&user), &project).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.session_ttl_hours, 48);
    }

    #[test]
    fn test_engine_section_layering() {
        let dir = TempDir::new().unwrap();
        let user = write_config(&dir, "user.toml", "[engine]\nprepopulation_confidence = 0.6\n");
        let project = write_config(&dir, "project.toml", "[engine]\nbatch_size = 3\n");

        let config = ConfigLoader::load_layers(Some(&user), &project).unwrap();
        assert_eq!(config.engine.batch_size, 3);
        assert_eq!(config.engine.prepopulation_confidence, 0.6);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let project = write_config(&dir, "project.toml", "[server\nport = ");
        let err = ConfigLoader::load_layers(None, &project).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    #[serial]
    fn test_project_config_path_env_override() {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialized with other env-touching tests
        unsafe { std::env::set_var(PROJECT_CONFIG_DIR_ENV, dir.path()) };
        let path = ConfigLoader::project_config_path();
        unsafe { std::env::remove_var(PROJECT_CONFIG_DIR_ENV) };

        assert_eq!(path, dir.path().join("config.toml"));
    }

    #[test]
    #[serial]
    fn test_project_config_path_default() {
        unsafe { std::env::remove_var(PROJECT_CONFIG_DIR_ENV) };
        assert_eq!(
            ConfigLoader::project_config_path(),
            PathBuf::from(".compass/config.toml")
        );
    }
}
