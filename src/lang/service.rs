//! Client for the external schema/typecheck service.
//!
//! The compiler never parses the target command language itself. Translating
//! legacy-syntax examples and typechecking an assembled corpus are delegated
//! to a separate service behind [`LanguageService`]; deployments without one
//! run with [`NullLanguageService`] and fail those operations cleanly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::config::LanguageServiceConfig;
use crate::errors::{AppError, AppResult, CompileError};

/// Syntax generation of the target command language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxVersion {
    Legacy,
    Current,
}

/// Translation and typechecking capabilities of the language service.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Re-render one example program between syntax generations.
    async fn translate(
        &self,
        code: &str,
        from: SyntaxVersion,
        to: SyntaxVersion,
    ) -> AppResult<String>;

    /// Parse and typecheck an assembled corpus, re-serializing it for the
    /// given compatibility target. Returns the (possibly rewritten) corpus.
    async fn check_dataset(&self, corpus: &str, compatibility: Option<&str>)
        -> AppResult<String>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    code: &'a str,
    from: SyntaxVersion,
    to: SyntaxVersion,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    code: String,
}

#[derive(Debug, Serialize)]
struct CheckDatasetRequest<'a> {
    corpus: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatibility: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CheckDatasetResponse {
    corpus: String,
}

/// HTTP client for a remote language service.
pub struct HttpLanguageService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpLanguageService {
    pub fn new(config: &LanguageServiceConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            AppError::configuration(format!("invalid language service URL '{}': {}", config.url, e))
        })?;

        let client = reqwest::Client::builder()
            .user_agent("corpus-forge/language-service")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("bad language service endpoint {path}: {e}")))
    }
}

#[async_trait]
impl LanguageService for HttpLanguageService {
    async fn translate(
        &self,
        code: &str,
        from: SyntaxVersion,
        to: SyntaxVersion,
    ) -> AppResult<String> {
        let url = self.endpoint("translate")?;
        let response = self
            .client
            .post(url)
            .json(&TranslateRequest { code, from, to })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompileError::Translation {
                message: format!("language service returned {status}: {body}"),
            }
            .into());
        }

        let payload: TranslateResponse = response.json().await?;
        Ok(payload.code)
    }

    async fn check_dataset(
        &self,
        corpus: &str,
        compatibility: Option<&str>,
    ) -> AppResult<String> {
        let url = self.endpoint("typecheck")?;
        let response = self
            .client
            .post(url)
            .json(&CheckDatasetRequest {
                corpus,
                compatibility,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompileError::Typecheck {
                message: format!("language service returned {status}: {body}"),
            }
            .into());
        }

        let payload: CheckDatasetResponse = response.json().await?;
        Ok(payload.corpus)
    }
}

/// No-op stand-in used when no language service is configured.
pub struct NullLanguageService;

#[async_trait]
impl LanguageService for NullLanguageService {
    async fn translate(
        &self,
        _code: &str,
        _from: SyntaxVersion,
        _to: SyntaxVersion,
    ) -> AppResult<String> {
        Err(CompileError::Translation {
            message: "no language service configured to translate legacy syntax".to_string(),
        }
        .into())
    }

    async fn check_dataset(
        &self,
        _corpus: &str,
        _compatibility: Option<&str>,
    ) -> AppResult<String> {
        Err(CompileError::Typecheck {
            message: "no language service configured to typecheck datasets".to_string(),
        }
        .into())
    }
}
