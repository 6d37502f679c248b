use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use corpus_forge::{
    config::Config,
    database::Database,
    i18n::TokenizerRegistry,
    lang::service::{HttpLanguageService, LanguageService, NullLanguageService},
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "corpus-forge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Knowledge-base backend for voice-assistant training data")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("corpus_forge={},tower_http=trace", cli.log_level)
    } else {
        format!("corpus_forge={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CorpusForge v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    tokio::fs::create_dir_all(&config.storage.upload_path).await?;
    info!(
        "Upload spool directory ready: {}",
        config.storage.upload_path.display()
    );

    // The language service is optional; without it legacy-syntax rows and
    // compatibility requests fail instead of being translated.
    let language_service: Arc<dyn LanguageService> = match &config.language_service {
        Some(service_config) => {
            info!("Using language service at {}", service_config.url);
            Arc::new(HttpLanguageService::new(service_config)?)
        }
        None => {
            warn!("No language service configured; legacy syntax translation is disabled");
            Arc::new(NullLanguageService)
        }
    };

    let tokenizers = Arc::new(TokenizerRegistry::new());

    let state = AppState::new(database, config, language_service, tokenizers);
    let web_server = WebServer::new(state)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );

    // Create a channel to signal when the server is ready or fails to bind
    let (server_ready_tx, server_ready_rx) = tokio::sync::oneshot::channel();

    // Start the web server in a separate task
    let server_handle = tokio::spawn(async move {
        // This will signal immediately when bind succeeds/fails, then block until shutdown
        if let Err(e) = web_server.serve_with_signal(server_ready_tx).await {
            tracing::error!("Web server failed: {}", e);
        }
    });

    // Wait for the server bind result (success or failure)
    match server_ready_rx.await {
        Ok(Ok(())) => {
            info!("Web server is now listening");
        }
        Ok(Err(bind_error)) => {
            tracing::error!("Failed to bind web server: {}", bind_error);
            return Err(bind_error);
        }
        Err(_) => {
            tracing::error!("Web server task completed without signaling");
            return Err(anyhow::anyhow!("Web server failed to start"));
        }
    }

    // Wait for the server to complete (this will block until shutdown)
    server_handle.await?;

    Ok(())
}
