//! Surface syntax helpers for the target command language.
//!
//! The compiler treats the language as opaque except for the few syntactic
//! cues it needs: leading statement keywords, `@`-prefixed function
//! invocations, the legacy `:=` marker, `prefix:suffix` identifiers and the
//! string escaping used when rendering corpus text.

pub mod service;

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::models::ExampleType;

/// Fully-qualified name of the free-form reply primitive. An example invoking
/// only this function carries no semantic cue in its code, so it is classified
/// from its utterance instead.
pub const FREE_FORM_REPLY_FN: &str = "org.corpusforge.builtin.core.faq_reply";

static LET_TABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*let\s+table").unwrap());
static LET_KEYWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*let\s+(stream|query|action)").unwrap());
static LEADING_KEYWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(stream|query|action|program)").unwrap());
static FUNCTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\s*([a-z0-9_-]+(?:\.[a-z0-9_-]+)*)").unwrap());
static QUALIFIED_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_.-]*):([A-Za-z_][A-Za-z0-9_]*)$").unwrap());
static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$(?:\$|([a-z0-9_]+)|\{([a-z0-9_]+)(?::([a-z0-9_-]+))?\})").unwrap()
});

/// Strip surrounding whitespace and one trailing statement terminator.
///
/// The result is the canonical form used as the deduplication key: two
/// renderings that differ only in trailing `;` or whitespace compare equal.
pub fn strip_terminator(code: &str) -> &str {
    let trimmed = code.trim();
    match trimmed.strip_suffix(';') {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    }
}

/// `true` if the code uses the legacy named-assignment syntax generation.
pub fn is_legacy_syntax(code: &str) -> bool {
    code.contains(":=")
}

/// Rewrite the deprecated `let table` / `let <keyword>` statement heads to
/// their bare-keyword equivalents.
pub fn rewrite_leading_let(code: &str) -> String {
    let code = LET_TABLE_PATTERN.replace(code, "query");
    let code = LET_KEYWORD_PATTERN.replace(&code, "$1");
    code.into_owned()
}

/// Classify a program by its leading statement keyword. `None` means the code
/// starts with something else entirely and the example is a generic program.
pub fn leading_keyword(code: &str) -> Option<ExampleType> {
    LEADING_KEYWORD_PATTERN
        .captures(code)
        .map(|caps| match &caps[1] {
            "stream" => ExampleType::Stream,
            "query" => ExampleType::Query,
            "action" => ExampleType::Action,
            _ => ExampleType::Program,
        })
}

/// Collect the fully-qualified names of every function the code invokes, in
/// invocation order.
pub fn invoked_functions(code: &str) -> Vec<String> {
    FUNCTION_PATTERN
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Split a `prefix:suffix` identifier, validating both halves.
pub fn parse_qualified_id(id: &str) -> Option<(&str, &str)> {
    QUALIFIED_ID_PATTERN.captures(id).map(|caps| {
        let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        (prefix, suffix)
    })
}

/// Quote a string for embedding in corpus annotations.
pub fn string_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// One piece of an utterance split around its `$`-parameter placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UtteranceChunk {
    /// Literal text between placeholders
    Text(String),
    /// A `$name` or `${name:option}` placeholder
    Param {
        param: String,
        option: Option<String>,
    },
}

/// Split an utterance into literal text and parameter placeholders, for
/// cheatsheet display. `$$` escapes a literal dollar sign.
pub fn split_params(utterance: &str) -> Vec<UtteranceChunk> {
    let mut chunks = Vec::new();
    let mut text = String::new();
    let mut last = 0;

    for caps in PARAM_PATTERN.captures_iter(utterance) {
        let matched = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        text.push_str(&utterance[last..matched.0]);
        last = matched.1;

        match caps.get(1).or_else(|| caps.get(2)) {
            Some(name) => {
                if !text.is_empty() {
                    chunks.push(UtteranceChunk::Text(std::mem::take(&mut text)));
                }
                chunks.push(UtteranceChunk::Param {
                    param: name.as_str().to_string(),
                    option: caps.get(3).map(|m| m.as_str().to_string()),
                });
            }
            None => text.push('$'),
        }
    }

    text.push_str(&utterance[last..]);
    if !text.is_empty() {
        chunks.push(UtteranceChunk::Text(text));
    }

    chunks
}
