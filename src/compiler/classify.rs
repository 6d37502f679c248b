//! Semantic type classification of compiled examples.
//!
//! Classification runs in two passes. The first pass buckets every example
//! that declares its type through a leading keyword and, along the way,
//! records the role each invoked function plays. The second pass resolves the
//! leftover keyword-less examples from those recorded roles, which is why it
//! must not start until the first pass has seen every example.

use std::collections::HashMap;

use crate::lang;
use crate::models::{CompiledExample, ExampleType};

/// Examples bucketed by resolved type, in the order serialization emits them.
#[derive(Debug, Default)]
pub struct ClassifiedExamples {
    pub streams: Vec<CompiledExample>,
    pub queries: Vec<CompiledExample>,
    pub actions: Vec<CompiledExample>,
}

impl ClassifiedExamples {
    pub fn len(&self) -> usize {
        self.streams.len() + self.queries.len() + self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Streams, then queries, then actions.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &CompiledExample> {
        self.streams
            .iter()
            .chain(self.queries.iter())
            .chain(self.actions.iter())
    }

    pub fn into_ordered(self) -> Vec<CompiledExample> {
        let mut ordered = self.streams;
        ordered.extend(self.queries);
        ordered.extend(self.actions);
        ordered
    }
}

/// Assign every example a type in `{stream, query, action}`.
///
/// Old-style `let` declarations are rewritten to their keyword form first, so
/// the rewritten code is what later stages see. Within each bucket,
/// keyword-classified examples keep their input order and resolved
/// keyword-less ones follow them.
pub fn classify_examples(examples: Vec<CompiledExample>) -> ClassifiedExamples {
    let mut function_roles: HashMap<String, ExampleType> = HashMap::new();

    let mut classified = ClassifiedExamples::default();
    let mut pending = Vec::new();

    for mut example in examples {
        example.canonical_code = lang::rewrite_leading_let(&example.canonical_code);
        example.example_type =
            lang::leading_keyword(&example.canonical_code).unwrap_or(ExampleType::Program);

        let functions = lang::invoked_functions(&example.canonical_code);
        match example.example_type {
            ExampleType::Action => {
                // The last invocation is the action itself; anything invoked
                // before it is read as a query feeding into it.
                if let Some((last, rest)) = functions.split_last() {
                    for function in rest {
                        function_roles.insert(function.clone(), ExampleType::Query);
                    }
                    function_roles.insert(last.clone(), ExampleType::Action);
                }
            }
            ExampleType::Stream | ExampleType::Query => {
                for function in functions {
                    function_roles.insert(function, ExampleType::Query);
                }
            }
            ExampleType::Program => {}
        }

        match example.example_type {
            ExampleType::Stream => classified.streams.push(example),
            ExampleType::Query => classified.queries.push(example),
            ExampleType::Action => classified.actions.push(example),
            ExampleType::Program => pending.push(example),
        }
    }

    for mut example in pending {
        let functions = lang::invoked_functions(&example.canonical_code);
        example.example_type = resolve_program_type(&example, &functions, &function_roles);
        if example.example_type == ExampleType::Query {
            classified.queries.push(example);
        } else {
            classified.actions.push(example);
        }
    }

    classified
}

fn resolve_program_type(
    example: &CompiledExample,
    functions: &[String],
    function_roles: &HashMap<String, ExampleType>,
) -> ExampleType {
    if let [only] = functions {
        if only == lang::FREE_FORM_REPLY_FN {
            // A free-form reply answers a question when there was one.
            let raw = example.primary_utterance();
            let utterance = raw.strip_prefix(',').unwrap_or(raw);
            return if utterance.ends_with('?') {
                ExampleType::Query
            } else {
                ExampleType::Action
            };
        }
    }

    let all_queries = functions
        .iter()
        .all(|f| function_roles.get(f) == Some(&ExampleType::Query));
    if all_queries {
        ExampleType::Query
    } else {
        ExampleType::Action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(id: i64, utterance: &str, code: &str) -> CompiledExample {
        CompiledExample {
            canonical_code: code.to_string(),
            utterances: vec![utterance.to_string()],
            preprocessed_forms: vec![utterance.to_lowercase()],
            id,
            click_count: 0,
            like_count: 0,
            name: None,
            kind: None,
            example_type: ExampleType::Program,
        }
    }

    #[test]
    fn leading_keywords_pick_the_bucket() {
        let classified = classify_examples(vec![
            example(1, "when it rains", "stream (@weather.monitor())"),
            example(2, "the weather", "query (@weather.current())"),
            example(3, "turn on the light", "action (@light.set_power(power=enum on))"),
        ]);

        assert_eq!(classified.streams.len(), 1);
        assert_eq!(classified.queries.len(), 1);
        assert_eq!(classified.actions.len(), 1);
        assert_eq!(classified.streams[0].example_type, ExampleType::Stream);
    }

    #[test]
    fn let_declarations_are_rewritten_before_classification() {
        let classified = classify_examples(vec![
            example(1, "the current weather", "let table x = @weather.current()"),
            example(2, "monitor rain", "let stream s = monitor(@weather.current())"),
        ]);

        assert_eq!(classified.queries.len(), 1);
        assert_eq!(
            classified.queries[0].canonical_code,
            "query x = @weather.current()"
        );
        assert_eq!(classified.streams.len(), 1);
        assert_eq!(
            classified.streams[0].canonical_code,
            "stream s = monitor(@weather.current())"
        );
    }

    #[test]
    fn keyword_less_examples_resolve_from_recorded_roles() {
        let classified = classify_examples(vec![
            example(1, "the weather", "query (@weather.current())"),
            example(2, "turn on the light", "action (@light.set_power())"),
            example(3, "check the weather", "now => @weather.current() => notify"),
            example(4, "lights on", "now => @light.set_power()"),
        ]);

        // the keyword-less weather program reads as a query, the light one
        // as an action
        assert_eq!(classified.queries.len(), 2);
        assert_eq!(classified.queries[1].id, 3);
        assert_eq!(classified.actions.len(), 2);
        assert_eq!(classified.actions[1].id, 4);
    }

    #[test]
    fn unknown_functions_default_to_action() {
        let classified = classify_examples(vec![example(
            1,
            "do the thing",
            "now => @mystery.gadget() => notify",
        )]);

        assert_eq!(classified.actions.len(), 1);
    }

    #[test]
    fn programs_without_invocations_default_to_query() {
        let classified = classify_examples(vec![example(1, "nothing at all", "now => notify")]);

        assert_eq!(classified.queries.len(), 1);
    }

    #[test]
    fn free_form_replies_split_on_question_mark() {
        let code = format!("now => @{}(reply=\"sure\")", lang::FREE_FORM_REPLY_FN);

        let classified = classify_examples(vec![
            example(1, "what can you do?", &code),
            example(2, "say something nice", &code),
        ]);

        assert_eq!(classified.queries.len(), 1);
        assert_eq!(classified.queries[0].id, 1);
        assert_eq!(classified.actions.len(), 1);
        assert_eq!(classified.actions[0].id, 2);
    }

    #[test]
    fn free_form_reply_check_ignores_a_leading_comma() {
        let code = format!("now => @{}(reply=\"sure\")", lang::FREE_FORM_REPLY_FN);

        let classified = classify_examples(vec![example(1, ",is it raining?", &code)]);
        assert_eq!(classified.queries.len(), 1);
    }

    #[test]
    fn resolved_programs_follow_keyword_classified_ones() {
        let classified = classify_examples(vec![
            example(1, "keyword-less weather", "now => @weather.current() => notify"),
            example(2, "the weather", "query (@weather.current())"),
        ]);

        // input order put the program first, output order puts it last
        let ids: Vec<i64> = classified.queries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn function_roles_are_last_write_wins() {
        // the same function is first recorded as an action, then as a query;
        // the keyword-less example sees the later record
        let classified = classify_examples(vec![
            example(1, "toggle it", "action (@gadget.toggle())"),
            example(2, "the toggle state", "query (@gadget.toggle())"),
            example(3, "gadget toggle", "now => @gadget.toggle() => notify"),
        ]);

        assert_eq!(classified.queries.len(), 2);
        assert!(classified.queries.iter().any(|e| e.id == 3));
    }

    #[test]
    fn classification_is_deterministic() {
        let build = || {
            vec![
                example(1, "a", "query (@a.one())"),
                example(2, "b", "action (@b.two())"),
                example(3, "c", "now => @a.one() => notify"),
            ]
        };

        let first: Vec<(i64, ExampleType)> = classify_examples(build())
            .into_ordered()
            .into_iter()
            .map(|e| (e.id, e.example_type))
            .collect();
        let second: Vec<(i64, ExampleType)> = classify_examples(build())
            .into_ordered()
            .into_iter()
            .map(|e| (e.id, e.example_type))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn ordered_output_groups_streams_queries_actions() {
        let ordered = classify_examples(vec![
            example(1, "turn on", "action (@light.on())"),
            example(2, "when it rains", "stream (@weather.monitor())"),
            example(3, "the weather", "query (@weather.current())"),
        ])
        .into_ordered();

        let types: Vec<ExampleType> = ordered.iter().map(|e| e.example_type).collect();
        assert_eq!(
            types,
            vec![ExampleType::Stream, ExampleType::Query, ExampleType::Action]
        );
    }
}
