//! Request extractors and validation
//!
//! This module provides custom extractors for request processing, most
//! importantly the uploader authorization context resolved from trusted
//! gateway headers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use super::responses::ApiResponse;
use crate::models::Uploader;

/// Administrator flag set by the fronting auth layer.
pub const ADMIN_HEADER: &str = "x-forge-admin";

/// Developer organization id set by the fronting auth layer.
pub const ORG_HEADER: &str = "x-forge-org";

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(message.to_string())),
    )
        .into_response()
}

impl<S> FromRequestParts<S> for Uploader
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true") || value == "1");

        let org = match parts.headers.get(ORG_HEADER) {
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| bad_request("Invalid organization header"))?;
                let parsed = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| bad_request("Invalid organization header"))?;
                Some(parsed)
            }
            None => None,
        };

        Ok(Uploader { admin, org })
    }
}
