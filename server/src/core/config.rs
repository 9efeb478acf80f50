use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{CONFIG_FILE_NAME, DEFAULT_DB_PATH, DEFAULT_HOST, DEFAULT_PORT};
use crate::data::filters::AttributeStorage;

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub path: Option<PathBuf>,
    pub attribute_storage: Option<AttributeStorage>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Top-level keys this version does not understand
    fn unknown_fields(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }

    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Explicit CORS origins; empty means derive from host and port
    pub allowed_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub attribute_storage: AttributeStorage,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. CLI-specified config path, or `manta.json` in the working directory
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let file_path = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if local.exists() { Some(local) } else { None }
            }
        };

        let file_config = match &file_path {
            Some(path) => {
                let config = FileConfig::load_from_file(path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };
        tracing::debug!(config = ?file_path, "Config file resolved");

        let config = Self::layer(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            db = %config.database.path.display(),
            storage = %config.database.attribute_storage,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Defaults, then file values, then CLI/env values
    fn layer(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);
        let allowed_origins = cli
            .allowed_origins
            .clone()
            .or(file_server.allowed_origins)
            .unwrap_or_default()
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let path = cli
            .db_path
            .clone()
            .or(file_database.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        let attribute_storage = cli
            .attribute_storage
            .or(file_database.attribute_storage)
            .unwrap_or_default();

        // --debug can only turn debug on
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Self {
            server: ServerConfig {
                host,
                port,
                allowed_origins,
            },
            database: DatabaseConfig {
                path,
                attribute_storage,
            },
            debug,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind an arbitrary port that OTLP exporters cannot find
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.database.path.as_os_str().is_empty() {
            anyhow::bail!("Configuration error: database.path must not be empty");
        }

        if self.server.allowed_origins.iter().any(|o| o == "*")
            && self.server.allowed_origins.len() > 1
        {
            tracing::warn!("server.allowed_origins contains \"*\"; other entries are ignored");
        }

        Ok(())
    }
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn cli_with_file(file: &NamedTempFile) -> CliConfig {
        CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 5000, "allowed_origins": ["http://ui.test"] },
            "database": { "path": "/var/lib/manta.db", "attribute_storage": "key_value" },
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(5000));
        let database = config.database.unwrap();
        assert_eq!(database.attribute_storage, Some(AttributeStorage::KeyValue));
        assert_eq!(config.debug, Some(true));
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "sever": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.unknown_fields(), vec!["sever"]);
    }

    #[test]
    fn test_file_config_rejects_bad_storage() {
        let json = r#"{ "database": { "attribute_storage": "columnar" } }"#;
        assert!(serde_json::from_str::<FileConfig>(json).is_err());
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default());
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.database.path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.database.attribute_storage, AttributeStorage::Json);
        assert!(!config.debug);
    }

    #[test]
    fn test_app_config_file_values() {
        let file = write_config(
            r#"{ "server": { "port": 5000 }, "database": { "attribute_storage": "key_value" } }"#,
        );
        let config = AppConfig::load(&cli_with_file(&file)).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.database.attribute_storage, AttributeStorage::KeyValue);
    }

    #[test]
    fn test_app_config_cli_override() {
        let file = write_config(
            r#"{ "server": { "host": "file.host", "port": 5000 }, "database": { "path": "file.db" } }"#,
        );
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            allowed_origins: Some(vec![" http://a.test ".to_string(), "".to_string()]),
            db_path: Some(PathBuf::from("cli.db")),
            attribute_storage: Some(AttributeStorage::KeyValue),
            debug: true,
            config: Some(file.path().to_path_buf()),
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.allowed_origins, vec!["http://a.test"]);
        assert_eq!(config.database.path, PathBuf::from("cli.db"));
        assert_eq!(config.database.attribute_storage, AttributeStorage::KeyValue);
        assert!(config.debug);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/manta.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_malformed_config_file_is_error() {
        let file = write_config("{ not json");
        let err = AppConfig::load(&cli_with_file(&file)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let file = write_config(r#"{ "server": { "host": "" } }"#);
        let err = AppConfig::load(&cli_with_file(&file)).unwrap_err();
        assert!(err.to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let file = write_config(r#"{ "server": { "port": 0 } }"#);
        let err = AppConfig::load(&cli_with_file(&file)).unwrap_err();
        assert!(err.to_string().contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_app_config_validation_empty_db_path() {
        let file = write_config(r#"{ "database": { "path": "" } }"#);
        let err = AppConfig::load(&cli_with_file(&file)).unwrap_err();
        assert!(err.to_string().contains("database.path must not be empty"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
    }
}
