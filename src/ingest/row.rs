//! Row Normalizer: interpret a raw 1-3 column row as a weighted value.
//!
//! Column sniffing rules, checked in order:
//! 1. one cell: the value, weight 1.0
//! 2. two cells: the second is a weight if it parses as a finite number,
//!    otherwise it is the preprocessed form
//! 3. three or more cells: value, preprocessed form, weight
//!
//! Any absent, unparsable or non-positive weight becomes 1.0.

use std::sync::Arc;

use crate::i18n::Tokenizer;
use crate::models::NormalizedValue;

pub struct RowNormalizer {
    tokenizer: Arc<dyn Tokenizer>,
    already_preprocessed: bool,
}

impl RowNormalizer {
    /// `already_preprocessed` marks uploads whose values are their own
    /// preprocessed form, skipping tokenization entirely.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, already_preprocessed: bool) -> Self {
        Self {
            tokenizer,
            already_preprocessed,
        }
    }

    /// Normalize one row. `None` means the row is skipped: blank first cell,
    /// or a tokenization that produced an uppercase token (an entity-like
    /// placeholder leaked into free text, which must not contaminate the
    /// string corpus).
    pub fn normalize(&self, row: &[String]) -> Option<NormalizedValue> {
        let value = row.first()?;
        if value.trim().is_empty() {
            return None;
        }

        let (supplied, weight) = match row.len() {
            1 => (None, 1.0),
            2 => interpret_second_cell(&row[1]),
            _ => (Some(row[1].clone()), parse_weight(&row[2])),
        };
        let weight = if weight > 0.0 { weight } else { 1.0 };

        let preprocessed = match supplied {
            Some(preprocessed) => preprocessed,
            None if self.already_preprocessed => value.clone(),
            None => {
                let tokens = self.tokenizer.tokenize(value).tokens;
                if tokens
                    .iter()
                    .any(|t| t.chars().any(char::is_uppercase))
                {
                    return None;
                }
                tokens.join(" ")
            }
        };

        Some(NormalizedValue {
            value: value.clone(),
            preprocessed,
            weight,
        })
    }
}

/// A two-cell row is ambiguous: `cell1` is a weight when it reads as a finite
/// number (an empty cell counts as an absent weight), otherwise it is the
/// preprocessed form.
fn interpret_second_cell(cell: &str) -> (Option<String>, f64) {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return (None, f64::NAN);
    }
    match trimmed.parse::<f64>() {
        Ok(weight) if weight.is_finite() => (None, weight),
        _ => (Some(cell.to_string()), 1.0),
    }
}

fn parse_weight(cell: &str) -> f64 {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
        .unwrap_or(1.0)
}
