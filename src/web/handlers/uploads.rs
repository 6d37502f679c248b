//! Dataset upload HTTP handlers
//!
//! Multipart uploads are spooled to a temp file under the configured upload
//! directory, handed to the ingestion service, and removed when the request
//! settles regardless of outcome.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use futures::StreamExt;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::errors::{AppResult, WebError};
use crate::i18n::locale_to_language;
use crate::ingest::{EntityUploadRequest, StringUploadRequest, UploadSummary};
use crate::models::Uploader;
use crate::web::{
    AppState,
    handlers::ensure_language,
    responses::{handle_error, ok},
};

/// An upload body spooled to disk. The file is unlinked on drop, so holding
/// this guard for the duration of the service call is what keeps the file
/// alive for the decoder.
struct SpooledUpload {
    file: NamedTempFile,
}

impl SpooledUpload {
    fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Upload entity values
///
/// Upserts the entity type and replaces its value set from the attached
/// CSV file (`value,name` rows). Without NER support only the metadata is
/// written and no file is required.
#[utoipa::path(
    post,
    path = "/entities/upload",
    tag = "uploads",
    request_body(content = String, description = "Multipart form data: entity_id, entity_name, no_ner_support, locale and a CSV `upload` part"),
    responses(
        (status = 200, description = "Entity values replaced", body = UploadSummary),
        (status = 400, description = "Malformed identifier, license or file"),
        (status = 403, description = "Caller does not own the device matching the id prefix"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn upload_entity_values(
    State(state): State<AppState>,
    uploader: Uploader,
    multipart: Multipart,
) -> impl IntoResponse {
    match run_entity_upload(&state, &uploader, multipart).await {
        Ok(summary) => {
            info!(
                "Entity upload for {} wrote {} rows",
                summary.id, summary.rows_written
            );
            ok(summary).into_response()
        }
        Err(err) => {
            error!("Entity upload failed: {}", err);
            handle_error(err).into_response()
        }
    }
}

/// Upload a string dataset
///
/// Upserts the string type and replaces its weighted values from the
/// attached TSV file (`value`, optional `preprocessed`, optional `weight`).
#[utoipa::path(
    post,
    path = "/strings/upload",
    tag = "uploads",
    request_body(content = String, description = "Multipart form data: type_name, name, license, attribution, preprocessed, locale and a TSV `upload` part"),
    responses(
        (status = 200, description = "String values replaced", body = UploadSummary),
        (status = 400, description = "Malformed identifier, license or file"),
        (status = 403, description = "Caller does not own the device matching the id prefix"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn upload_string_values(
    State(state): State<AppState>,
    uploader: Uploader,
    multipart: Multipart,
) -> impl IntoResponse {
    match run_string_upload(&state, &uploader, multipart).await {
        Ok(summary) => {
            info!(
                "String upload for {} wrote {} rows",
                summary.id, summary.rows_written
            );
            ok(summary).into_response()
        }
        Err(err) => {
            error!("String upload failed: {}", err);
            handle_error(err).into_response()
        }
    }
}

async fn run_entity_upload(
    state: &AppState,
    uploader: &Uploader,
    mut multipart: Multipart,
) -> AppResult<UploadSummary> {
    let mut entity_id: Option<String> = None;
    let mut entity_name: Option<String> = None;
    let mut no_ner_support = false;
    let mut locale: Option<String> = None;
    let mut upload: Option<SpooledUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(WebError::Multipart)? {
        match field.name() {
            Some("entity_id") => entity_id = Some(text_field(field).await?),
            Some("entity_name") => entity_name = Some(text_field(field).await?),
            Some("no_ner_support") => no_ner_support = flag_field(&text_field(field).await?),
            Some("locale") => locale = Some(text_field(field).await?),
            Some("upload") => {
                upload = Some(spool_field(&state.config.storage.upload_path, field).await?);
            }
            other => {
                debug!("Ignoring multipart field: {:?}", other);
            }
        }
    }

    let entity_id = entity_id.ok_or_else(|| WebError::missing_field("entity_id"))?;
    // An absent display name behaves like re-uploading the raw id, which
    // preserves the existing name on update.
    let entity_name = entity_name.unwrap_or_else(|| entity_id.clone());

    ensure_language(&state.config, locale_to_language(locale.as_deref()))?;

    let request = EntityUploadRequest {
        entity_id,
        entity_name,
        no_ner_support,
        locale,
    };
    state
        .uploads
        .upload_entities(uploader, request, upload.as_ref().map(SpooledUpload::path))
        .await
}

async fn run_string_upload(
    state: &AppState,
    uploader: &Uploader,
    mut multipart: Multipart,
) -> AppResult<UploadSummary> {
    let mut type_name: Option<String> = None;
    let mut name: Option<String> = None;
    let mut license: Option<String> = None;
    let mut attribution: Option<String> = None;
    let mut preprocessed = false;
    let mut locale: Option<String> = None;
    let mut upload: Option<SpooledUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(WebError::Multipart)? {
        match field.name() {
            Some("type_name") => type_name = Some(text_field(field).await?),
            Some("name") => name = Some(text_field(field).await?),
            Some("license") => license = Some(text_field(field).await?),
            Some("attribution") => {
                let value = text_field(field).await?;
                if !value.trim().is_empty() {
                    attribution = Some(value);
                }
            }
            Some("preprocessed") => preprocessed = flag_field(&text_field(field).await?),
            Some("locale") => locale = Some(text_field(field).await?),
            Some("upload") => {
                upload = Some(spool_field(&state.config.storage.upload_path, field).await?);
            }
            other => {
                debug!("Ignoring multipart field: {:?}", other);
            }
        }
    }

    let type_name = type_name.ok_or_else(|| WebError::missing_field("type_name"))?;
    let license = license.ok_or_else(|| WebError::missing_field("license"))?;
    let name = name.unwrap_or_else(|| type_name.clone());

    ensure_language(&state.config, locale_to_language(locale.as_deref()))?;

    let request = StringUploadRequest {
        type_name,
        name,
        license,
        attribution,
        preprocessed,
        locale,
    };
    state
        .uploads
        .upload_string_dataset(uploader, request, upload.as_ref().map(SpooledUpload::path))
        .await
}

async fn text_field(field: Field<'_>) -> Result<String, WebError> {
    field.text().await.map_err(WebError::Multipart)
}

fn flag_field(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Stream a multipart file part into a temp file under the upload directory.
async fn spool_field(upload_dir: &Path, mut field: Field<'_>) -> AppResult<SpooledUpload> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let file = NamedTempFile::new_in(upload_dir)?;

    let mut out = tokio::fs::File::create(file.path()).await?;
    let mut bytes: u64 = 0;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(WebError::Multipart)?;
        bytes += chunk.len() as u64;
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    debug!("Spooled {} upload bytes to {}", bytes, file.path().display());
    Ok(SpooledUpload { file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_field_accepts_form_style_booleans() {
        assert!(flag_field("1"));
        assert!(flag_field("true"));
        assert!(flag_field("On"));
        assert!(flag_field(" yes "));
        assert!(!flag_field(""));
        assert!(!flag_field("0"));
        assert!(!flag_field("false"));
    }
}
