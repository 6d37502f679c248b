//! Dataset compilation
//!
//! Turns persisted example rows into corpus text in the target command
//! language: deduplicate by canonical program (4.x `dedup`), resolve each
//! example's semantic type (`classify`), then render the grouped set
//! (`serialize`). The cheatsheet assembler reuses the same stages to build
//! per-device example listings.

pub mod cheatsheet;
pub mod classify;
pub mod dedup;
pub mod serialize;

use std::sync::Arc;
use tracing::debug;

use crate::errors::AppResult;
use crate::lang::service::LanguageService;
use crate::models::RawExample;

use classify::classify_examples;
use serialize::{render_dataset, RenderMode};

/// Options for one compilation call.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub edit_mode: bool,
    /// Omit `#[id=...]` annotations in edit mode (entries not saved yet)
    pub skip_id: bool,
    /// Typecheck the assembled corpus and re-serialize it for
    /// `compat_version` before returning it
    pub needs_compatibility: bool,
    pub compat_version: Option<String>,
}

/// End-to-end corpus compiler over raw example rows.
pub struct DatasetCompiler {
    language_service: Arc<dyn LanguageService>,
}

impl DatasetCompiler {
    pub fn new(language_service: Arc<dyn LanguageService>) -> Self {
        Self { language_service }
    }

    /// Compile rows into one `dataset` block of corpus text.
    pub async fn compile(
        &self,
        name: &str,
        language: &str,
        rows: Vec<RawExample>,
        options: &CompileOptions,
    ) -> AppResult<String> {
        debug!(
            "Compiling dataset @{} for language {}: {} rows",
            name,
            language,
            rows.len()
        );

        let compiled = dedup::merge_duplicates(rows, self.language_service.as_ref()).await?;
        let classified = classify_examples(compiled);
        let mode = if options.edit_mode {
            RenderMode::Edit {
                skip_id: options.skip_id,
            }
        } else {
            RenderMode::Display
        };
        let corpus = render_dataset(name, language, &classified, mode);

        if options.needs_compatibility {
            return self
                .language_service
                .check_dataset(&corpus, options.compat_version.as_deref())
                .await;
        }
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, CompileError};
    use crate::lang::service::{NullLanguageService, SyntaxVersion};
    use async_trait::async_trait;

    fn raw(id: i64, utterance: &str, code: &str) -> RawExample {
        RawExample {
            id,
            language: "en".to_string(),
            utterance: utterance.to_string(),
            preprocessed: utterance.to_lowercase(),
            target_code: code.to_string(),
            click_count: 0,
            like_count: 0,
            name: None,
            kind: None,
        }
    }

    #[tokio::test]
    async fn compile_deduplicates_and_groups() {
        let compiler = DatasetCompiler::new(Arc::new(NullLanguageService));
        let rows = vec![
            raw(1, "turn on the light", "action (@light.on());"),
            raw(2, "the weather", "query (@weather.current())"),
            raw(3, "lights on please", "action (@light.on())"),
        ];

        let corpus = compiler
            .compile("everything", "en", rows, &CompileOptions::default())
            .await
            .unwrap();

        assert!(corpus.starts_with("dataset @everything\n#[language=\"en\"] {\n"));
        assert!(corpus.ends_with('}'));
        // two blocks survive, queries before actions
        assert_eq!(corpus.matches("#_[utterances=[").count(), 2);
        assert!(corpus.contains("#_[utterances=[\"turn on the light\",\"lights on please\"]]"));
        let query_at = corpus.find("query (@weather.current())").unwrap();
        let action_at = corpus.find("action (@light.on())").unwrap();
        assert!(query_at < action_at);
    }

    #[tokio::test]
    async fn edit_mode_output_scans_back_to_the_input() {
        let compiler = DatasetCompiler::new(Arc::new(NullLanguageService));
        let rows = vec![
            raw(1, "turn it on", "action (@light.on())"),
            raw(2, "switch on the light", "action (@light.on())"),
        ];

        let options = CompileOptions {
            edit_mode: true,
            ..CompileOptions::default()
        };
        let corpus = compiler
            .compile("everything", "en", rows, &options)
            .await
            .unwrap();

        // the code line round-trips with its terminator stripped
        assert!(corpus.contains("\n  action (@light.on())\n"));
        let expected_list = format!(
            "#_[utterances=[\"turn it on\",\n{}\"switch on the light\"]]",
            " ".repeat(19)
        );
        assert!(corpus.contains(&expected_list));
        assert!(corpus.contains("\n  #[id=1]\n"));
        assert!(!corpus.contains("click_count"));
    }

    struct RecordingTypechecker;

    #[async_trait]
    impl LanguageService for RecordingTypechecker {
        async fn translate(
            &self,
            code: &str,
            _from: SyntaxVersion,
            _to: SyntaxVersion,
        ) -> AppResult<String> {
            Ok(code.to_string())
        }

        async fn check_dataset(
            &self,
            corpus: &str,
            compatibility: Option<&str>,
        ) -> AppResult<String> {
            Ok(format!(
                "// target {}\n{corpus}",
                compatibility.unwrap_or("latest")
            ))
        }
    }

    #[tokio::test]
    async fn compatibility_step_rewrites_the_corpus() {
        let compiler = DatasetCompiler::new(Arc::new(RecordingTypechecker));
        let rows = vec![raw(1, "the weather", "query (@weather.current())")];

        let options = CompileOptions {
            needs_compatibility: true,
            compat_version: Some("1.11.0".to_string()),
            ..CompileOptions::default()
        };
        let corpus = compiler
            .compile("everything", "en", rows, &options)
            .await
            .unwrap();
        assert!(corpus.starts_with("// target 1.11.0\n"));
    }

    #[tokio::test]
    async fn compatibility_failure_aborts_compilation() {
        let compiler = DatasetCompiler::new(Arc::new(NullLanguageService));
        let rows = vec![raw(1, "the weather", "query (@weather.current())")];

        let options = CompileOptions {
            needs_compatibility: true,
            ..CompileOptions::default()
        };
        let result = compiler.compile("everything", "en", rows, &options).await;
        assert!(matches!(
            result,
            Err(AppError::Compile(CompileError::Typecheck { .. }))
        ));
    }
}
