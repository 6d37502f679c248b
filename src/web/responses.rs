//! HTTP response types and utilities
//!
//! This module provides standardized response types and error handling
//! for the web layer, ensuring consistent API responses across all endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult, CompileError, IngestError, WebError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    /// Request timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create an error response with details
    pub fn error_with_details(message: String, details: HashMap<String, String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: Some(details),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self)).into_response()
    }
}

/// Helper function to convert AppResult to HTTP response
pub fn handle_result<T>(result: AppResult<T>) -> impl IntoResponse
where
    T: Serialize,
{
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(error) => handle_error(error).into_response(),
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> impl IntoResponse {
    let (status, message, details) = match &error {
        AppError::InvalidInput { message } => (StatusCode::BAD_REQUEST, message.clone(), None),
        AppError::Forbidden { message } => (StatusCode::FORBIDDEN, message.clone(), None),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{} with id '{}' not found", resource, id),
            None,
        ),
        AppError::Ingest(ingest_error) => match ingest_error {
            IngestError::Decode { .. } => {
                (StatusCode::BAD_REQUEST, ingest_error.to_string(), None)
            }
            IngestError::ChannelClosed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ingest_error.to_string(),
                None,
            ),
        },
        AppError::Compile(compile_error) => match compile_error {
            CompileError::MissingProgram { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Stored corpus is inconsistent: {compile_error}"),
                None,
            ),
            CompileError::Typecheck { .. } | CompileError::Translation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                compile_error.to_string(),
                None,
            ),
        },
        AppError::Web(web_error) => match web_error {
            WebError::InvalidRequest { field, message } => {
                let mut details = HashMap::new();
                details.insert(field.clone(), message.clone());
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid request".to_string(),
                    Some(details),
                )
            }
            WebError::MissingField { .. }
            | WebError::Multipart(_)
            | WebError::JsonParse(_) => (StatusCode::BAD_REQUEST, web_error.to_string(), None),
        },
        AppError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database operation failed".to_string(),
            None,
        ),
        AppError::Repository(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Data access failed".to_string(),
            None,
        ),
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Configuration error: {}", message),
            None,
        ),
        AppError::ExternalService { service, message } => (
            StatusCode::BAD_GATEWAY,
            format!("External service error ({}): {}", service, message),
            None,
        ),
        AppError::Http(_) => (
            StatusCode::BAD_GATEWAY,
            "External service communication failed".to_string(),
            None,
        ),
        AppError::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "File operation failed".to_string(),
            None,
        ),
        AppError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", message),
            None,
        ),
    };

    let response = if let Some(details) = details {
        ApiResponse::<()>::error_with_details(message, details)
    } else {
        ApiResponse::<()>::error(message)
    };

    (status, Json(response)).into_response()
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}
