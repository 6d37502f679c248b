//! Cheatsheet HTTP handlers
//!
//! Returns the device catalog with classified examples attached, optionally
//! restricted to the devices visible on one client platform.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::compiler::cheatsheet::{self, CheatsheetDevice};
use crate::errors::AppResult;
use crate::web::{
    AppState,
    handlers::ensure_language,
    responses::{handle_error, ok},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheatsheetQuery {
    /// Client platform (`gnome`, `android`, `server`); unset serves everything
    pub platform: Option<String>,
}

/// Cheatsheet of devices with their classified examples
#[utoipa::path(
    get,
    path = "/cheatsheet/{language}",
    tag = "cheatsheet",
    params(
        ("language" = String, Path, description = "Language code, e.g. en", example = "en"),
        ("platform" = Option<String>, Query, description = "Restrict to devices visible on this platform"),
    ),
    responses(
        (status = 200, description = "Devices with attached examples", body = Vec<CheatsheetDevice>),
        (status = 400, description = "Unsupported language"),
        (status = 500, description = "Stored corpus is inconsistent"),
    )
)]
pub async fn get_cheatsheet(
    State(state): State<AppState>,
    Path(language): Path<String>,
    Query(query): Query<CheatsheetQuery>,
) -> impl IntoResponse {
    match assemble_cheatsheet(&state, &language, query.platform.as_deref()).await {
        Ok(devices) => {
            debug!(
                "Cheatsheet for {} covers {} devices",
                language,
                devices.len()
            );
            ok(devices).into_response()
        }
        Err(err) => {
            error!("Cheatsheet assembly for {} failed: {}", language, err);
            handle_error(err).into_response()
        }
    }
}

async fn assemble_cheatsheet(
    state: &AppState,
    language: &str,
    platform: Option<&str>,
) -> AppResult<Vec<CheatsheetDevice>> {
    ensure_language(&state.config, language)?;

    let devices = state.devices.find_all_approved().await?;
    let rows = state.examples.cheatsheet_rows(language).await?;
    cheatsheet::assemble(devices, rows, platform, state.language_service.as_ref()).await
}
