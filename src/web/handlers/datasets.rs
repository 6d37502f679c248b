//! Corpus download HTTP handlers
//!
//! Serves the compiled dataset for a language as plain text. Display
//! rendering is the default; `?edit=true` switches to the edit rendering
//! and `?compat=<version>` engages the typecheck step.

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::compiler::CompileOptions;
use crate::errors::AppResult;
use crate::web::{AppState, handlers::ensure_language, responses::handle_error};

/// Query options of the corpus download.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetQuery {
    #[serde(default)]
    pub edit: bool,
    #[serde(default)]
    pub skip_id: bool,
    pub compat: Option<String>,
}

/// Download the compiled corpus for a language
#[utoipa::path(
    get,
    path = "/datasets/{language}",
    tag = "datasets",
    params(
        ("language" = String, Path, description = "Language code, e.g. en", example = "en"),
        ("edit" = Option<bool>, Query, description = "Render the edit form instead of the display form"),
        ("skip_id" = Option<bool>, Query, description = "Omit id annotations in the edit form"),
        ("compat" = Option<String>, Query, description = "Typecheck and re-serialize for this syntax version"),
    ),
    responses(
        (status = 200, description = "Serialized dataset", content_type = "text/plain"),
        (status = 400, description = "Unsupported language"),
        (status = 422, description = "Compatibility typecheck failed"),
        (status = 500, description = "Stored corpus is inconsistent"),
    )
)]
pub async fn get_dataset(
    State(state): State<AppState>,
    Path(language): Path<String>,
    Query(query): Query<DatasetQuery>,
) -> impl IntoResponse {
    match render_dataset(&state, &language, &query).await {
        Ok(corpus) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            corpus,
        )
            .into_response(),
        Err(err) => {
            error!("Dataset compilation for {} failed: {}", language, err);
            handle_error(err).into_response()
        }
    }
}

async fn render_dataset(
    state: &AppState,
    language: &str,
    query: &DatasetQuery,
) -> AppResult<String> {
    ensure_language(&state.config, language)?;

    let rows = state.examples.for_language(language).await?;
    info!("Compiling dataset for {}: {} rows", language, rows.len());

    let options = CompileOptions {
        edit_mode: query.edit,
        skip_id: query.skip_id,
        needs_compatibility: query.compat.is_some(),
        compat_version: query.compat.clone(),
    };
    state
        .compiler
        .compile(&state.config.compiler.dataset_name, language, rows, &options)
        .await
}
