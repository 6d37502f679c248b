//! HTTP request handlers
//!
//! Handlers are thin wrappers around the service layer: they map multipart
//! and query parameters into service requests and convert results through
//! the shared response envelope.

pub mod cheatsheet;
pub mod datasets;
pub mod health;
pub mod strings;
pub mod uploads;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Reject reads and uploads for languages this deployment does not serve.
pub(crate) fn ensure_language(config: &Config, language: &str) -> AppResult<()> {
    if config.language_enabled(language) {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "Unsupported language: {language}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_outside_the_served_list_are_rejected() {
        let mut config = Config::default();
        config.i18n.languages = vec!["en".to_string(), "it".to_string()];

        assert!(ensure_language(&config, "en").is_ok());
        assert!(ensure_language(&config, "it").is_ok());

        let error = ensure_language(&config, "zz").unwrap_err();
        assert!(error.to_string().contains("Unsupported language"));
    }
}
