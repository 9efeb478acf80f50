//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::check;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::EventStore;
use crate::data::filters::AttributeStorage;
use crate::data::sql::Backend;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub store: Arc<EventStore>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Check {
                filter,
                attributes,
                dialect,
                storage,
            }) => Self::run_check(&cli_config, &filter, &attributes, dialect, storage),
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let store = EventStore::init(&config.database.path, config.database.attribute_storage)
            .await
            .with_context(|| {
                format!(
                    "Failed to open event store: {}",
                    config.database.path.display()
                )
            })?;
        let store = Arc::new(store);
        tracing::debug!(
            storage = %store.compiler().attribute_storage(),
            "Event store initialized"
        );

        let shutdown = ShutdownService::new(store.clone());

        Ok(Self {
            shutdown,
            config,
            store,
        })
    }

    fn run_check(
        cli: &CliConfig,
        filter: &str,
        attributes: &[String],
        dialect: Backend,
        storage: Option<AttributeStorage>,
    ) -> Result<()> {
        let storage = storage.or(cli.attribute_storage).unwrap_or_default();
        match check::check(filter, attributes, dialect, storage) {
            Ok(report) => {
                print!("{}", report);
                Ok(())
            }
            Err((e, diagnostic)) => {
                eprintln!("{}", diagnostic);
                Err(e.into())
            }
        }
    }

    fn init_logging(debug: bool) {
        let level = if debug { "debug" } else { "info" };
        let default_filter = format!("{},{}={}", level, APP_NAME_LOWER, level);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Signal handlers go in before anything that can block
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        banner::print_banner(&app.config);

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(self.store.start_checkpoint_task(self.shutdown.subscribe()))
            .await;

        tracing::debug!("Background tasks started");
    }
}
