//! OpenAPI documentation generation using utoipa
//!
//! This module provides OpenAPI specification generation using utoipa
//! annotations on handler functions, served through Swagger UI at `/docs`.

use utoipa::OpenApi;

/// Main OpenAPI specification for the CorpusForge API
///
/// Handler functions are annotated with `#[utoipa::path]`; schemas are
/// generated at compile time via `#[derive(ToSchema)]`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CorpusForge API",
        version = "0.0.1",
        description = "
# CorpusForge API

Knowledge-base backend for voice-assistant training data.

## Features

- **Dataset uploads**: streaming CSV/TSV ingestion of entity values and
  weighted string datasets, with transactional replace-on-conflict semantics
- **Corpus compilation**: deduplication, classification and serialization of
  the example corpus into `dataset` blocks, display or edit rendering
- **Cheatsheet**: per-device classified examples with platform filtering
- **Read-back**: string types and values for training-data consumers
- **Compatibility**: optional typecheck and re-serialization against an
  older syntax version through the language service

Visit `/docs` for the interactive documentation.
        ",
        contact(name = "CorpusForge Support"),
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api/v1", description = "API Version 1"),
    ),
    tags(
        (name = "uploads", description = "Entity value and string dataset uploads"),
        (name = "datasets", description = "Compiled corpus downloads"),
        (name = "cheatsheet", description = "Device catalog with classified examples"),
        (name = "strings", description = "String dataset read-back"),
        (name = "health", description = "Service health monitoring"),
    ),
    components(
        schemas(
            // Core models
            crate::models::License,
            crate::models::ExampleType,
            crate::models::StringType,
            crate::models::StringValue,
            crate::lang::UtteranceChunk,

            // Upload DTOs
            crate::ingest::UploadSummary,

            // Cheatsheet DTOs
            crate::compiler::cheatsheet::CheatsheetDevice,
            crate::compiler::cheatsheet::CheatsheetExample,

            // Read-back DTOs
            crate::web::handlers::strings::StringTypeDetailResponse,
            crate::web::handlers::health::HealthStatus,

            // Response wrappers
            crate::web::responses::ApiResponse<crate::ingest::UploadSummary>,
            crate::web::responses::ApiResponse<crate::web::handlers::health::HealthStatus>,
        )
    ),
    paths(
        // Upload endpoints
        crate::web::handlers::uploads::upload_entity_values,
        crate::web::handlers::uploads::upload_string_values,

        // Corpus endpoints
        crate::web::handlers::datasets::get_dataset,
        crate::web::handlers::cheatsheet::get_cheatsheet,

        // Read-back endpoints
        crate::web::handlers::strings::list_string_types,
        crate::web::handlers::strings::get_string_type,

        // Health endpoints
        crate::web::handlers::health::health_check,
        crate::web::handlers::health::readiness_check,
        crate::web::handlers::health::liveness_check,
    )
)]
pub struct ApiDoc;

/// Get the OpenAPI specification with the crate version filled in
pub fn spec() -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi
}
