//! Web layer module
//!
//! This module provides the HTTP interface for the CorpusForge application.
//! It follows clean architecture principles with thin handlers that delegate
//! to the service layer for business logic.
//!
//! # Architecture
//!
//! The web layer is organized into several components:
//! - **Handlers**: HTTP request handlers organized by domain
//! - **Responses**: Standardized response types and error handling
//! - **Extractors**: Uploader authorization context from gateway headers
//!
//! # Design Principles
//!
//! - **Thin Handlers**: Controllers contain minimal logic, delegating to services
//! - **Consistent Responses**: All endpoints use standardized response formats
//! - **Proper Error Handling**: Errors are mapped to appropriate HTTP status codes

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{
    compiler::DatasetCompiler,
    config::Config,
    database::{
        Database,
        repositories::{DeviceSeaOrmRepository, ExampleSeaOrmRepository, StringTypeSeaOrmRepository},
    },
    i18n::TokenizerRegistry,
    ingest::UploadService,
    lang::service::LanguageService,
};

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod responses;

// Re-export commonly used types
pub use responses::{ApiResponse, handle_error, handle_result};

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    /// Create a new web server over the shared application state
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        let app = Self::create_router(state);

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        let max_upload_bytes = state.config.web.max_upload_bytes;

        Router::new()
            // Health check endpoints (no auth required)
            .route("/health", get(handlers::health::health_check))
            .route("/ready", get(handlers::health::readiness_check))
            .route("/live", get(handlers::health::liveness_check))
            // OpenAPI documentation
            .merge(Self::openapi_routes())
            // API v1 routes
            .nest("/api/v1", Self::api_v1_routes())
            // Middleware (applied in reverse order)
            .layer(DefaultBodyLimit::max(max_upload_bytes))
            .layer(CorsLayer::permissive())
            // Shared state
            .with_state(state)
    }

    /// OpenAPI documentation routes
    fn openapi_routes() -> Router<AppState> {
        use utoipa_swagger_ui::SwaggerUi;

        Router::new()
            // Swagger UI serves both /docs and /api/openapi.json
            .merge(SwaggerUi::new("/docs").url("/api/openapi.json", openapi::spec()))
    }

    /// API v1 routes
    fn api_v1_routes() -> Router<AppState> {
        Router::new()
            .route(
                "/entities/upload",
                post(handlers::uploads::upload_entity_values),
            )
            .route(
                "/strings/upload",
                post(handlers::uploads::upload_string_values),
            )
            .route("/datasets/{language}", get(handlers::datasets::get_dataset))
            .route(
                "/cheatsheet/{language}",
                get(handlers::cheatsheet::get_cheatsheet),
            )
            .route(
                "/strings/{language}",
                get(handlers::strings::list_string_types),
            )
            .route(
                "/strings/{language}/{type_name}",
                get(handlers::strings::get_string_type),
            )
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Serve with a notification when the server is actually listening or
    /// fails to bind, shutting down gracefully on SIGTERM/SIGINT
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                // Signal that we're now actually listening on the port
                let _ = ready_signal.send(Ok(()));

                let shutdown_signal = async move {
                    #[cfg(unix)]
                    {
                        use tokio::signal::unix::{SignalKind, signal};
                        let mut sigterm = signal(SignalKind::terminate())
                            .expect("failed to install SIGTERM handler");
                        let mut sigint = signal(SignalKind::interrupt())
                            .expect("failed to install SIGINT handler");

                        tokio::select! {
                            _ = sigterm.recv() => {
                                tracing::info!("Received SIGTERM, shutting down gracefully");
                            }
                            _ = sigint.recv() => {
                                tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                            }
                        }
                    }

                    #[cfg(not(unix))]
                    {
                        use tokio::signal;
                        signal::ctrl_c()
                            .await
                            .expect("failed to install Ctrl+C handler");
                        tracing::info!("Received Ctrl+C, shutting down gracefully");
                    }
                };

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal)
                    .await?;
                Ok(())
            }
            Err(bind_error) => {
                // Signal the bind failure immediately
                let message = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", message)));
                Err(anyhow::anyhow!("{}", message))
            }
        }
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub config: Config,
    pub uploads: Arc<UploadService>,
    pub compiler: Arc<DatasetCompiler>,
    pub devices: Arc<DeviceSeaOrmRepository>,
    pub examples: Arc<ExampleSeaOrmRepository>,
    pub strings: Arc<StringTypeSeaOrmRepository>,
    pub language_service: Arc<dyn LanguageService>,
}

impl AppState {
    /// Wire the services and repositories over one database handle
    pub fn new(
        database: Database,
        config: Config,
        language_service: Arc<dyn LanguageService>,
        tokenizers: Arc<TokenizerRegistry>,
    ) -> Self {
        let connection = database.connection();
        let uploads = Arc::new(UploadService::new(
            connection.clone(),
            tokenizers,
            config.ingestion.clone(),
        ));
        let compiler = Arc::new(DatasetCompiler::new(language_service.clone()));
        let devices = Arc::new(DeviceSeaOrmRepository::new(database.read_connection()));
        let examples = Arc::new(ExampleSeaOrmRepository::new(database.read_connection()));
        let strings = Arc::new(StringTypeSeaOrmRepository::new(database.read_connection()));

        Self {
            database,
            config,
            uploads,
            compiler,
            devices,
            examples,
            strings,
            language_service,
        }
    }
}
