//! Locale handling and text tokenization.
//!
//! The service stores everything keyed by bare language code; request locales
//! like `en-US` or `zh_TW.UTF-8` collapse to their leading language tag.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Keep only the language part of a locale. We do not distinguish `en-US`
/// from `en-GB` yet.
pub fn locale_to_language(locale: Option<&str>) -> &str {
    let locale = match locale {
        Some(l) if !l.is_empty() => l,
        _ => return "en",
    };

    locale.split(['-', '_', '@', '.']).next().unwrap_or("en")
}

/// Token sequence produced by a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<String>,
}

impl Tokenized {
    /// Canonical space-joined rendering of the token sequence.
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Locale-sensitive text tokenizer.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Tokenized;
}

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w'-]+|[^\w\s]").unwrap());
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").unwrap());

/// Whitespace-and-punctuation tokenizer that lowercases words but leaves
/// `NUMBER_0`-style placeholder tokens untouched, so the uppercase-token
/// filter in the ingestion pipeline can still spot them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Tokenized {
        let tokens = WORD_PATTERN
            .find_iter(text)
            .map(|m| {
                let token = m.as_str();
                if PLACEHOLDER_PATTERN.is_match(token) {
                    token.to_string()
                } else {
                    token.to_lowercase()
                }
            })
            .collect();

        Tokenized { tokens }
    }
}

/// Per-language tokenizer lookup. Every language currently falls back to the
/// [`SimpleTokenizer`]; registering a language-specific implementation is a
/// matter of inserting it here at startup.
pub struct TokenizerRegistry {
    by_language: HashMap<String, Arc<dyn Tokenizer>>,
    fallback: Arc<dyn Tokenizer>,
}

impl TokenizerRegistry {
    pub fn new() -> Self {
        Self {
            by_language: HashMap::new(),
            fallback: Arc::new(SimpleTokenizer),
        }
    }

    /// Register a tokenizer for one language code.
    pub fn register(&mut self, language: impl Into<String>, tokenizer: Arc<dyn Tokenizer>) {
        self.by_language.insert(language.into(), tokenizer);
    }

    /// Tokenizer for a language, falling back to the default implementation.
    pub fn for_language(&self, language: &str) -> Arc<dyn Tokenizer> {
        self.by_language
            .get(language)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
