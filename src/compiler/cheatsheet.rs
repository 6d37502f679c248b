//! Cheatsheet assembly: approved devices joined with their classified
//! examples, restricted to one client platform.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{classify, dedup};
use crate::errors::AppResult;
use crate::lang::service::LanguageService;
use crate::lang::{split_params, UtteranceChunk};
use crate::models::{CompiledExample, Device, ExampleType, RawExample};

/// One example as shown on the cheatsheet.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheatsheetExample {
    pub utterance: String,
    /// Utterance split around `$`-parameter placeholders for rendering
    pub utterance_chunks: Vec<UtteranceChunk>,
    pub target_code: String,
    pub example_type: ExampleType,
}

/// One device section of the cheatsheet.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheatsheetDevice {
    pub primary_kind: String,
    pub name: String,
    pub examples: Vec<CheatsheetExample>,
}

/// Builtin device kinds that exist on exactly one client platform.
fn platform_for_builtin(kind: &str) -> Option<&'static str> {
    match kind {
        "org.corpusforge.builtin.desktop" => Some("gnome"),
        "org.corpusforge.builtin.phone" => Some("android"),
        _ => None,
    }
}

fn uses_oauth_factory(device: &Device) -> bool {
    let Some(factory) = device
        .factory
        .as_deref()
        .filter(|f| !f.is_empty() && *f != "null")
    else {
        return false;
    };

    match serde_json::from_str::<serde_json::Value>(factory) {
        Ok(descriptor) => descriptor.get("type").and_then(|t| t.as_str()) == Some("oauth2"),
        Err(e) => {
            warn!(
                "Unparseable factory descriptor for {}: {}",
                device.primary_kind, e
            );
            false
        }
    }
}

fn visible_on_platform(device: &Device, platform: Option<&str>) -> bool {
    // OAuth-configured devices cannot complete their flow on a headless
    // server install.
    if platform == Some("server") && uses_oauth_factory(device) {
        return false;
    }
    if let (Some(platform), Some(locked)) = (platform, platform_for_builtin(&device.primary_kind))
    {
        if platform != locked {
            return false;
        }
    }
    true
}

/// Join devices with deduplicated, classified examples.
///
/// Deduplication runs across the whole example set so a program shared by two
/// devices appears only once, under the device of its first occurrence.
/// Examples whose kind matches no visible device are dropped with a
/// diagnostic.
pub async fn assemble(
    devices: Vec<Device>,
    rows: Vec<RawExample>,
    platform: Option<&str>,
    language_service: &dyn LanguageService,
) -> AppResult<Vec<CheatsheetDevice>> {
    let visible: Vec<Device> = devices
        .into_iter()
        .filter(|d| visible_on_platform(d, platform))
        .collect();

    let mut index_by_kind: HashMap<&str, usize> = HashMap::new();
    for (index, device) in visible.iter().enumerate() {
        index_by_kind.insert(device.primary_kind.as_str(), index);
    }

    let compiled = dedup::merge_duplicates(rows, language_service).await?;
    let mut per_device: Vec<Vec<CompiledExample>> = vec![Vec::new(); visible.len()];
    for example in compiled {
        let Some(kind) = example.kind.as_deref() else {
            debug!("Example {} names no device kind", example.id);
            continue;
        };
        match index_by_kind.get(kind) {
            Some(&index) => per_device[index].push(example),
            None => debug!("Unrecognized device kind {}", kind),
        }
    }
    drop(index_by_kind);

    let sections = visible
        .into_iter()
        .zip(per_device)
        .map(|(device, examples)| CheatsheetDevice {
            primary_kind: device.primary_kind,
            name: device.name,
            examples: classify::classify_examples(examples)
                .into_ordered()
                .into_iter()
                .map(to_cheatsheet_example)
                .collect(),
        })
        .collect();

    Ok(sections)
}

fn to_cheatsheet_example(example: CompiledExample) -> CheatsheetExample {
    let raw = example.primary_utterance();
    let utterance = raw.strip_prefix(',').unwrap_or(raw).to_string();

    CheatsheetExample {
        utterance_chunks: split_params(utterance.trim()),
        utterance,
        target_code: example.canonical_code,
        example_type: example.example_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::service::NullLanguageService;
    use chrono::Utc;
    use tracing_test::traced_test;

    fn device(kind: &str, name: &str, factory: Option<&str>) -> Device {
        Device {
            id: 0,
            primary_kind: kind.to_string(),
            name: name.to_string(),
            owner_org: None,
            factory: factory.map(|f| f.to_string()),
            approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn raw(id: i64, kind: &str, utterance: &str, code: &str) -> RawExample {
        RawExample {
            id,
            language: "en".to_string(),
            utterance: utterance.to_string(),
            preprocessed: utterance.to_lowercase(),
            target_code: code.to_string(),
            click_count: 0,
            like_count: 0,
            name: None,
            kind: Some(kind.to_string()),
        }
    }

    #[tokio::test]
    async fn examples_attach_to_their_device() {
        let devices = vec![
            device("com.example.light", "Example Light", None),
            device("com.example.weather", "Example Weather", None),
        ];
        let rows = vec![
            raw(1, "com.example.light", "turn on", "action (@com.example.light.on())"),
            raw(2, "com.example.weather", "the weather", "query (@com.example.weather.current())"),
            raw(3, "com.example.light", "lights on", "action (@com.example.light.on());"),
        ];

        let sheet = assemble(devices, rows, None, &NullLanguageService)
            .await
            .unwrap();
        assert_eq!(sheet.len(), 2);
        // the duplicate code collapsed into one light example
        assert_eq!(sheet[0].examples.len(), 1);
        assert_eq!(sheet[0].examples[0].utterance, "turn on");
        assert_eq!(sheet[1].examples.len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn unrecognized_kinds_are_dropped_not_fatal() {
        let devices = vec![device("com.example.light", "Example Light", None)];
        let rows = vec![
            raw(1, "com.example.light", "turn on", "action (@com.example.light.on())"),
            raw(2, "com.gone.device", "do it", "action (@com.gone.device.go())"),
        ];

        let sheet = assemble(devices, rows, None, &NullLanguageService)
            .await
            .unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet[0].examples.len(), 1);
        assert!(logs_contain("Unrecognized device kind com.gone.device"));
    }

    #[tokio::test]
    async fn server_platform_hides_oauth_devices() {
        let devices = vec![
            device(
                "com.example.cloudy",
                "Cloudy",
                Some(r#"{"type":"oauth2","client_id":"x"}"#),
            ),
            device("com.example.light", "Example Light", Some("null")),
        ];
        let rows = vec![raw(
            1,
            "com.example.light",
            "turn on",
            "action (@com.example.light.on())",
        )];

        let sheet = assemble(devices, rows, Some("server"), &NullLanguageService)
            .await
            .unwrap();
        let kinds: Vec<&str> = sheet.iter().map(|d| d.primary_kind.as_str()).collect();
        assert_eq!(kinds, vec!["com.example.light"]);
    }

    #[tokio::test]
    async fn builtin_devices_stay_on_their_platform() {
        let devices = vec![
            device("org.corpusforge.builtin.desktop", "Desktop", None),
            device("org.corpusforge.builtin.phone", "Phone", None),
            device("com.example.light", "Example Light", None),
        ];

        let sheet = assemble(devices, Vec::new(), Some("android"), &NullLanguageService)
            .await
            .unwrap();
        let kinds: Vec<&str> = sheet.iter().map(|d| d.primary_kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["org.corpusforge.builtin.phone", "com.example.light"]
        );

        // without a platform filter every builtin is listed
        let devices = vec![
            device("org.corpusforge.builtin.desktop", "Desktop", None),
            device("org.corpusforge.builtin.phone", "Phone", None),
        ];
        let sheet = assemble(devices, Vec::new(), None, &NullLanguageService)
            .await
            .unwrap();
        assert_eq!(sheet.len(), 2);
    }

    #[tokio::test]
    async fn cheatsheet_utterances_lose_their_leading_comma() {
        let devices = vec![device("com.example.light", "Example Light", None)];
        let rows = vec![raw(
            1,
            "com.example.light",
            ",turn on $power",
            "action (@com.example.light.set(power=$power))",
        )];

        let sheet = assemble(devices, rows, None, &NullLanguageService)
            .await
            .unwrap();
        let example = &sheet[0].examples[0];
        assert_eq!(example.utterance, "turn on $power");
        assert!(example
            .utterance_chunks
            .iter()
            .any(|c| matches!(c, UtteranceChunk::Param { param, .. } if param == "power")));
    }
}
