use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// A device (skill) registered in the catalog.
///
/// Devices anchor two things in this service: upload authorization (the prefix
/// of an entity/string-type id must name a device owned by the caller's
/// organization) and the cheatsheet grouping (examples attach to the device
/// whose `primary_kind` they invoke).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(description = "Device catalog entry grouping examples and anchoring upload ownership")]
pub struct Device {
    pub id: i32,
    /// Fully-qualified kind, e.g. `com.acme.lights`
    pub primary_kind: String,
    pub name: String,
    /// Owning developer organization; `None` for unowned builtin devices
    pub owner_org: Option<i64>,
    /// Configuration factory descriptor (JSON); `type: oauth2` devices are
    /// hidden from the `server` platform cheatsheet
    pub factory: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named-entity type with its recognized value lexicon.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityType {
    /// `prefix:suffix` identifier, e.g. `com.acme.lights:room`
    pub id: String,
    pub language: String,
    pub name: String,
    pub is_well_known: bool,
    /// Entities without NER support carry no value lexicon
    pub has_ner_support: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recognized surface form of an entity value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityValue {
    pub id: i64,
    pub entity_id: String,
    pub language: String,
    /// Opaque value identifier as uploaded
    pub value: String,
    /// Tokenized form of the display name, used for matching
    pub canonical: String,
    pub name: String,
}

/// A weighted free-text string dataset (lexicon) descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StringType {
    pub id: i64,
    pub language: String,
    /// `prefix:suffix` identifier, e.g. `com.acme.lights:scene_name`
    pub type_name: String,
    pub name: String,
    pub license: License,
    pub attribution: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One weighted value of a string dataset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StringValue {
    pub id: i64,
    pub type_id: i64,
    pub value: String,
    pub preprocessed: String,
    pub weight: f64,
}

/// Licenses accepted for uploaded string datasets.
///
/// `PublicDomain` is the weakest claim: re-uploading a dataset as public-domain
/// over an already-licensed type keeps the existing license.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum License {
    PublicDomain,
    FreePermissive,
    FreeCopyleft,
    NonCommercial,
    Proprietary,
}

/// A persisted example row, read back for compilation. Immutable while a
/// compilation is running.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RawExample {
    pub id: i64,
    pub language: String,
    pub utterance: String,
    pub preprocessed: String,
    /// Program text in the target command language (current or legacy syntax)
    pub target_code: String,
    pub click_count: i32,
    pub like_count: i32,
    pub name: Option<String>,
    /// Primary kind of the device this example belongs to
    pub kind: Option<String>,
}

/// Semantic category of a compiled example.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExampleType {
    Stream,
    Query,
    Action,
    /// Provisional only; resolved to `Query` or `Action` before serialization
    Program,
}

/// The deduplication unit of the compiler: one canonical program with every
/// surface utterance that maps to it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompiledExample {
    /// Normalized program text with the trailing terminator stripped; identity
    pub canonical_code: String,
    /// Surface utterances in first-appearance row order
    pub utterances: Vec<String>,
    /// Tokenized utterances, parallel to `utterances`
    pub preprocessed_forms: Vec<String>,
    /// Id, click and like counts of the first folded row
    pub id: i64,
    pub click_count: i32,
    pub like_count: i32,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub example_type: ExampleType,
}

impl CompiledExample {
    /// First merged utterance; the classifier's utterance heuristics and the
    /// edit/display renderings read this slot.
    pub fn primary_utterance(&self) -> &str {
        self.utterances.first().map(String::as_str).unwrap_or("")
    }
}

/// Output of the Row Normalizer: one value ready for the persistence sink.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedValue {
    pub value: String,
    pub preprocessed: String,
    pub weight: f64,
}

/// Authorization context of an upload request, resolved by the fronting
/// auth layer before the request reaches this service.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uploader {
    pub admin: bool,
    /// Developer organization the caller belongs to, if any
    pub org: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn license_round_trips_kebab_case() {
        assert_eq!(License::from_str("public-domain").unwrap(), License::PublicDomain);
        assert_eq!(License::from_str("free-permissive").unwrap(), License::FreePermissive);
        assert_eq!(License::FreeCopyleft.to_string(), "free-copyleft");
        assert!(License::from_str("unlicensed").is_err());
    }

    #[test]
    fn example_type_parses_keywords() {
        assert_eq!(ExampleType::from_str("stream").unwrap(), ExampleType::Stream);
        assert_eq!(ExampleType::Action.to_string(), "action");
    }
}
