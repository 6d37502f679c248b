//! String dataset read-back HTTP handlers
//!
//! Training-data consumers list the string types of a language and fetch
//! one type's weighted values.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};
use crate::models::{StringType, StringValue};
use crate::web::{
    AppState,
    handlers::ensure_language,
    responses::{handle_error, ok},
};

/// One string type together with its value set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StringTypeDetailResponse {
    pub string_type: StringType,
    pub values: Vec<StringValue>,
}

/// List the string types of a language
#[utoipa::path(
    get,
    path = "/strings/{language}",
    tag = "strings",
    params(
        ("language" = String, Path, description = "Language code, e.g. en", example = "en"),
    ),
    responses(
        (status = 200, description = "String types for the language", body = Vec<StringType>),
        (status = 400, description = "Unsupported language"),
    )
)]
pub async fn list_string_types(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> impl IntoResponse {
    match fetch_string_types(&state, &language).await {
        Ok(types) => ok(types).into_response(),
        Err(err) => {
            error!("Listing string types for {} failed: {}", language, err);
            handle_error(err).into_response()
        }
    }
}

/// Fetch one string type and its values
#[utoipa::path(
    get,
    path = "/strings/{language}/{type_name}",
    tag = "strings",
    params(
        ("language" = String, Path, description = "Language code, e.g. en", example = "en"),
        ("type_name" = String, Path, description = "Qualified type name", example = "com.acme.lights:scene_name"),
    ),
    responses(
        (status = 200, description = "The string type with its values", body = StringTypeDetailResponse),
        (status = 400, description = "Unsupported language"),
        (status = 404, description = "No such string type"),
    )
)]
pub async fn get_string_type(
    State(state): State<AppState>,
    Path((language, type_name)): Path<(String, String)>,
) -> impl IntoResponse {
    match fetch_string_type(&state, &language, &type_name).await {
        Ok(detail) => ok(detail).into_response(),
        Err(err) => {
            error!("Fetching string type {} failed: {}", type_name, err);
            handle_error(err).into_response()
        }
    }
}

async fn fetch_string_types(state: &AppState, language: &str) -> AppResult<Vec<StringType>> {
    ensure_language(&state.config, language)?;
    Ok(state.strings.list_for_language(language).await?)
}

async fn fetch_string_type(
    state: &AppState,
    language: &str,
    type_name: &str,
) -> AppResult<StringTypeDetailResponse> {
    ensure_language(&state.config, language)?;

    let string_type = state
        .strings
        .find_by_type_name(language, type_name)
        .await?
        .ok_or_else(|| AppError::not_found("string type", type_name))?;
    let values = state.strings.values_for_type(string_type.id).await?;

    Ok(StringTypeDetailResponse {
        string_type,
        values,
    })
}
