use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_ALLOWED_ORIGINS, ENV_ATTRIBUTE_STORAGE, ENV_CONFIG, ENV_DB_PATH, ENV_DEBUG, ENV_HOST,
    ENV_PORT,
};
use crate::data::filters::AttributeStorage;
use crate::data::sql::Backend;

#[derive(Parser, Debug)]
#[command(name = "manta")]
#[command(version, about = "Event search over OpenTelemetry traces and logs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Allowed CORS origins, comma separated ("*" allows any)
    #[arg(long, global = true, env = ENV_ALLOWED_ORIGINS, value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    /// SQLite database file
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db_path: Option<PathBuf>,

    /// How filters look up event attributes (json or key_value)
    #[arg(long, global = true, env = ENV_ATTRIBUTE_STORAGE, value_parser = parse_attribute_storage)]
    pub attribute_storage: Option<AttributeStorage>,

    /// Enable debug logging
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

fn parse_attribute_storage(s: &str) -> Result<AttributeStorage, String> {
    s.parse()
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Compile a filter expression and print the SQL it produces
    Check {
        /// Filter expression, e.g. "http.status >= 500 AND message ~ 'timeout'"
        filter: String,

        /// Treat NAME as a known attribute (repeatable)
        #[arg(long = "attribute", short = 'a', value_name = "NAME")]
        attributes: Vec<String>,

        /// SQL dialect to emit (sqlite or postgres)
        #[arg(long, default_value = "sqlite", value_parser = parse_backend)]
        dialect: Backend,

        /// Attribute lookup strategy (json or key_value); defaults to the configured one
        #[arg(long, value_parser = parse_attribute_storage)]
        storage: Option<AttributeStorage>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub db_path: Option<PathBuf>,
    pub attribute_storage: Option<AttributeStorage>,
    pub debug: bool,
    pub config: Option<PathBuf>,
}

impl Cli {
    fn into_parts(self) -> (CliConfig, Option<Commands>) {
        let config = CliConfig {
            host: self.host,
            port: self.port,
            allowed_origins: self.allowed_origins,
            db_path: self.db_path,
            attribute_storage: self.attribute_storage,
            debug: self.debug,
            config: self.config,
        };
        (config, self.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into_parts()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> (CliConfig, Option<Commands>) {
        Cli::try_parse_from(args).unwrap().into_parts()
    }

    #[test]
    fn test_no_subcommand_means_start() {
        let (config, command) = parse_from(&["manta", "--port", "9000"]);
        assert!(command.is_none());
        assert_eq!(config.port, Some(9000));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let (config, command) = parse_from(&[
            "manta",
            "start",
            "--db-path",
            "/tmp/events.db",
            "--allowed-origins",
            "http://a.test,http://b.test",
        ]);
        assert!(matches!(command, Some(Commands::Start)));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/events.db")));
        assert_eq!(
            config.allowed_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
    }

    #[test]
    fn test_check_command() {
        let (_, command) = parse_from(&[
            "manta",
            "check",
            "status >= 500",
            "-a",
            "status",
            "--attribute",
            "http.route",
            "--dialect",
            "postgres",
            "--storage",
            "key_value",
        ]);
        match command {
            Some(Commands::Check {
                filter,
                attributes,
                dialect,
                storage,
            }) => {
                assert_eq!(filter, "status >= 500");
                assert_eq!(attributes, vec!["status", "http.route"]);
                assert_eq!(dialect, Backend::Postgres);
                assert_eq!(storage, Some(AttributeStorage::KeyValue));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_check_defaults() {
        let (_, command) = parse_from(&["manta", "check", "a = 1"]);
        match command {
            Some(Commands::Check {
                dialect, storage, ..
            }) => {
                assert_eq!(dialect, Backend::Sqlite);
                assert_eq!(storage, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_dialect_is_rejected() {
        assert!(Cli::try_parse_from(["manta", "check", "a = 1", "--dialect", "oracle"]).is_err());
    }
}
