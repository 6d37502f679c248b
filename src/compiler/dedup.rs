//! Example deduplication keyed by canonical program text.

use std::collections::HashMap;

use crate::errors::{AppResult, CompileError};
use crate::lang;
use crate::lang::service::{LanguageService, SyntaxVersion};
use crate::models::{CompiledExample, ExampleType, RawExample};

/// Normalize one row's program text into its dedup key.
///
/// Legacy-syntax programs are re-rendered under the current grammar first, so
/// both encodings of the same program land on the same key. The trailing
/// statement terminator and surrounding whitespace never count towards
/// identity.
async fn canonical_code(
    row: &RawExample,
    language_service: &dyn LanguageService,
) -> AppResult<String> {
    let raw = row.target_code.trim();
    if raw.is_empty() {
        return Err(CompileError::MissingProgram { id: row.id }.into());
    }

    let code = if lang::is_legacy_syntax(raw) {
        let translated = language_service
            .translate(raw, SyntaxVersion::Legacy, SyntaxVersion::Current)
            .await?;
        // The translator emits empty utterance annotations for bare
        // programs; they are noise for identity purposes.
        translated
            .replace("#_[utterances=[]]", "")
            .trim()
            .to_string()
    } else {
        raw.to_string()
    };

    Ok(lang::strip_terminator(&code).to_string())
}

/// Fold raw rows into [`CompiledExample`]s, one per distinct canonical code,
/// in first-appearance order.
///
/// Rows that hit an existing entry append their utterance and preprocessed
/// text and may backfill a missing name; id and click/like counts always come
/// from the first row folded in.
pub async fn merge_duplicates(
    rows: Vec<RawExample>,
    language_service: &dyn LanguageService,
) -> AppResult<Vec<CompiledExample>> {
    let mut compiled: Vec<CompiledExample> = Vec::new();
    let mut by_code: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let code = canonical_code(&row, language_service).await?;

        match by_code.get(&code) {
            Some(&index) => {
                let existing = &mut compiled[index];
                existing.utterances.push(row.utterance);
                existing.preprocessed_forms.push(row.preprocessed);
                if existing.name.is_none() {
                    existing.name = row.name.filter(|n| !n.is_empty());
                }
            }
            None => {
                by_code.insert(code.clone(), compiled.len());
                compiled.push(CompiledExample {
                    canonical_code: code,
                    utterances: vec![row.utterance],
                    preprocessed_forms: vec![row.preprocessed],
                    id: row.id,
                    click_count: row.click_count,
                    like_count: row.like_count,
                    name: row.name.filter(|n| !n.is_empty()),
                    kind: row.kind,
                    example_type: ExampleType::Program,
                });
            }
        }
    }

    Ok(compiled)
}
