//! Corpus rendering in the target command language.

use super::classify::ClassifiedExamples;
use crate::lang::string_escape;
use crate::models::CompiledExample;

/// How example blocks are rendered.
///
/// Display mode carries the full annotation set for read-only presentation.
/// Edit mode emits only what an editor needs to round-trip the example, and
/// can omit ids entirely for corpora whose entries are not saved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Display,
    Edit { skip_id: bool },
}

/// Render the classified example set as one `dataset` block.
pub fn render_dataset(
    name: &str,
    language: &str,
    examples: &ClassifiedExamples,
    mode: RenderMode,
) -> String {
    let mut blocks = String::new();
    for example in examples.iter_ordered() {
        match mode {
            RenderMode::Display => push_display_block(&mut blocks, example),
            RenderMode::Edit { skip_id } => push_edit_block(&mut blocks, example, skip_id),
        }
    }

    format!("dataset @{name}\n#[language=\"{language}\"] {{\n{blocks}}}")
}

fn join_escaped(texts: &[String]) -> String {
    texts
        .iter()
        .map(|t| string_escape(t))
        .collect::<Vec<_>>()
        .join(",")
}

fn push_display_block(out: &mut String, example: &CompiledExample) {
    let name = example.name.as_deref().unwrap_or("");
    let display_name = match example.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(kind) => format!("{kind}.{name}"),
        None => name.to_string(),
    };

    out.push_str(&format!(
        "  {}\n  #_[utterances=[{}]]\n  #_[preprocessed=[{}]]\n  #[id={}] #[click_count={}] #[like_count={}]\n  #[name={}];\n",
        example.canonical_code,
        join_escaped(&example.utterances),
        join_escaped(&example.preprocessed_forms),
        example.id,
        example.click_count,
        example.like_count,
        string_escape(&display_name),
    ));
}

fn push_edit_block(out: &mut String, example: &CompiledExample, skip_id: bool) {
    // Continuation lines align under the opening bracket of the list.
    let separator = format!(",\n{}", " ".repeat(19));
    let utterances = example
        .utterances
        .iter()
        .map(|u| string_escape(u))
        .collect::<Vec<_>>()
        .join(&separator);

    out.push_str(&format!(
        "  {}\n  #_[utterances=[{}]]\n",
        example.canonical_code, utterances
    ));
    if !skip_id {
        out.push_str(&format!("  #[id={}]\n", example.id));
    }
    out.push_str(&format!(
        "  #[name={}];\n\n",
        string_escape(example.name.as_deref().unwrap_or(""))
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::classify::classify_examples;
    use crate::models::ExampleType;

    fn example(id: i64, utterance: &str, code: &str) -> CompiledExample {
        CompiledExample {
            canonical_code: code.to_string(),
            utterances: vec![utterance.to_string()],
            preprocessed_forms: vec![utterance.to_lowercase()],
            id,
            click_count: 3,
            like_count: 1,
            name: Some("Example Name".to_string()),
            kind: Some("com.example".to_string()),
            example_type: ExampleType::Program,
        }
    }

    #[test]
    fn display_block_carries_every_annotation() {
        let classified = classify_examples(vec![example(
            42,
            "the current weather",
            "query (@weather.current())",
        )]);

        let corpus = render_dataset("everything", "en", &classified, RenderMode::Display);
        assert_eq!(
            corpus,
            "dataset @everything\n\
             #[language=\"en\"] {\n\
             \x20 query (@weather.current())\n\
             \x20 #_[utterances=[\"the current weather\"]]\n\
             \x20 #_[preprocessed=[\"the current weather\"]]\n\
             \x20 #[id=42] #[click_count=3] #[like_count=1]\n\
             \x20 #[name=\"com.example.Example Name\"];\n\
             }"
        );
    }

    #[test]
    fn display_mode_joins_multiple_utterances_with_commas() {
        let mut ex = example(1, "first", "query (@a.b())");
        ex.utterances.push("second".to_string());
        ex.preprocessed_forms.push("second".to_string());

        let corpus = render_dataset(
            "everything",
            "en",
            &classify_examples(vec![ex]),
            RenderMode::Display,
        );
        assert!(corpus.contains("#_[utterances=[\"first\",\"second\"]]"));
    }

    #[test]
    fn edit_blocks_align_utterance_continuations() {
        let mut ex = example(7, "first utterance", "query (@a.b())");
        ex.utterances.push("second utterance".to_string());
        ex.preprocessed_forms.push("second utterance".to_string());

        let corpus = render_dataset(
            "everything",
            "en",
            &classify_examples(vec![ex]),
            RenderMode::Edit { skip_id: false },
        );

        let expected_list = format!(
            "#_[utterances=[\"first utterance\",\n{}\"second utterance\"]]",
            " ".repeat(19)
        );
        assert!(corpus.contains(&expected_list));
        assert!(corpus.contains("\n  #[id=7]\n"));
        // edit mode names are not kind-prefixed and metadata counts are absent
        assert!(corpus.contains("#[name=\"Example Name\"];\n\n"));
        assert!(!corpus.contains("click_count"));
    }

    #[test]
    fn skip_id_omits_the_id_annotation() {
        let corpus = render_dataset(
            "everything",
            "en",
            &classify_examples(vec![example(7, "hi", "query (@a.b())")]),
            RenderMode::Edit { skip_id: true },
        );
        assert!(!corpus.contains("#[id="));
    }

    #[test]
    fn escaping_covers_quotes_backslashes_and_newlines() {
        let mut ex = example(1, "say \"hi\" \\ twice\nplease", "query (@a.b())");
        ex.preprocessed_forms = vec!["say \"hi\"".to_string()];

        let corpus = render_dataset(
            "everything",
            "en",
            &classify_examples(vec![ex]),
            RenderMode::Display,
        );
        assert!(corpus.contains(r#"#_[utterances=["say \"hi\" \\ twice\nplease"]]"#));
    }

    #[test]
    fn output_groups_by_resolved_type() {
        let mut action = example(1, "turn on", "action (@light.on())");
        action.name = None;
        let mut stream = example(2, "when it rains", "stream (@weather.monitor())");
        stream.name = None;
        let mut query = example(3, "the weather", "query (@weather.current())");
        query.name = None;

        let corpus = render_dataset(
            "everything",
            "en",
            &classify_examples(vec![action, stream, query]),
            RenderMode::Display,
        );

        let stream_at = corpus.find("stream (@weather.monitor())").unwrap();
        let query_at = corpus.find("query (@weather.current())").unwrap();
        let action_at = corpus.find("action (@light.on())").unwrap();
        assert!(stream_at < query_at && query_at < action_at);
    }

    #[test]
    fn empty_sets_render_an_empty_dataset_block() {
        let corpus = render_dataset(
            "everything",
            "en",
            &classify_examples(Vec::new()),
            RenderMode::Display,
        );
        assert_eq!(corpus, "dataset @everything\n#[language=\"en\"] {\n}");
    }
}
