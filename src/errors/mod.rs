//! Centralized error handling for the corpus-forge application
//!
//! This module provides a unified error system across all application layers
//! and keeps the mapping between failures and HTTP status codes in one place
//! (see `web::responses`).
//!
//! # Error Categories
//!
//! - **Database Errors**: SeaORM operations, migrations, connection issues
//! - **Ingest Errors**: tabular decoding and pipeline stage failures
//! - **Compile Errors**: dataset canonicalization, typecheck and translation
//! - **Web Errors**: HTTP request/response handling issues
//!
//! # Usage
//!
//! ```rust
//! use corpus_forge::errors::{AppError, AppResult};
//!
//! async fn example_function() -> AppResult<String> {
//!     // Function can return any error type that converts to AppError
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Ingest Results
pub type IngestResult<T> = Result<T, IngestError>;

/// Convenience type alias for Compile Results
pub type CompileResult<T> = Result<T, CompileError>;

/// Convenience type alias for Web Results
pub type WebResult<T> = Result<T, WebError>;
