//! Error type definitions for the corpus-forge application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Data access layer failures (repositories report through anyhow)
    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),

    /// Ingestion pipeline errors
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Dataset compilation errors
    #[error("Compilation error: {0}")]
    Compile(#[from] CompileError),

    /// Web layer errors
    #[error("Web error: {0}")]
    Web(#[from] WebError),

    /// Malformed caller input (bad identifier, missing file, bad license)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Authorization failures (identifier prefix not owned by the caller)
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// External service errors
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem errors (upload spool files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Streaming ingestion specific errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// The tabular decoder rejected a row; reported against the input line
    #[error("Malformed row at line {line}: {message}")]
    Decode { line: u64, message: String },

    /// The decode stage went away before signalling completion
    #[error("Upload stream closed before the decoder finished")]
    ChannelClosed,
}

/// Dataset compilation specific errors
#[derive(Error, Debug)]
pub enum CompileError {
    /// A persisted example row carries no program text; the stored corpus is
    /// inconsistent and the whole compilation aborts
    #[error("Example {id} has no usable program text")]
    MissingProgram { id: i64 },

    /// The compatibility step failed to parse or typecheck the assembled corpus
    #[error("Typecheck failed: {message}")]
    Typecheck { message: String },

    /// Legacy-syntax translation through the language service failed
    #[error("Syntax translation failed: {message}")]
    Translation { message: String },
}

/// Web layer specific errors
#[derive(Error, Debug)]
pub enum WebError {
    /// Invalid request format
    #[error("Invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    /// Missing required multipart part or form field
    #[error("Missing field: {field}")]
    MissingField { field: String },

    /// Multipart body could not be read
    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// JSON parsing errors
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create an invalid-input error with a custom message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an external service error
    pub fn external_service<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl WebError {
    /// Create an invalid-request error scoped to a field
    pub fn invalid_request<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a missing-field error
    pub fn missing_field<F: Into<String>>(field: F) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}
