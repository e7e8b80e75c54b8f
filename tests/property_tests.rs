//! Property-based tests for payload parsing and usage accounting

use baml_trace::providers::parse;
use baml_trace::{Role, TokenUsage};
use proptest::prelude::*;
use serde_json::{json, Value};

// Strategy for arbitrary JSON values of bounded depth
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ,.!?]{0,40}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z_]{1,12}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// Strategy for provider tags, known and unknown alike
fn provider_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("openai".to_string()),
        Just("azure-openai".to_string()),
        Just("anthropic".to_string()),
        "[a-z-]{1,16}",
    ]
}

proptest! {
    /// Parsing is total: no payload shape makes it panic or error out.
    #[test]
    fn test_parse_total_over_arbitrary_payloads(
        provider in provider_strategy(),
        request in json_strategy(),
        response in prop::option::of(json_strategy()),
    ) {
        let _ = parse(&provider, &request, response.as_ref());
    }

    /// An unrecognized provider tag yields the opaque passthrough: one
    /// message per raw body, no usage.
    #[test]
    fn test_unknown_provider_goes_opaque(
        provider in "[a-z]{1,12}".prop_filter("must not be a known tag", |p| {
            !matches!(p.as_str(), "openai" | "azure" | "anthropic")
        }),
        request in json_strategy(),
        response in prop::option::of(json_strategy()),
    ) {
        let expected = 1 + usize::from(response.is_some());
        let parsed = parse(&format!("{provider}-custom"), &request, response.as_ref());
        prop_assert_eq!(parsed.messages.len(), expected);
        prop_assert!(parsed.usage.is_none());
    }

    /// Parsing is a pure function: same inputs, same output, inputs
    /// untouched.
    #[test]
    fn test_parse_is_pure(
        provider in provider_strategy(),
        request in json_strategy(),
        response in prop::option::of(json_strategy()),
    ) {
        let request_before = request.clone();
        let first = parse(&provider, &request, response.as_ref());
        let second = parse(&provider, &request, response.as_ref());
        prop_assert_eq!(first, second);
        prop_assert_eq!(request, request_before);
    }

    /// Well-formed OpenAI exchanges keep one message per request entry
    /// plus the assistant turn, and carry usage through verbatim.
    #[test]
    fn test_openai_exchange_shape(
        contents in prop::collection::vec("[a-zA-Z0-9 ]{1,40}", 1..6),
        prompt_tokens in 0u64..100_000,
        completion_tokens in 0u64..100_000,
    ) {
        let request = json!({
            "messages": contents
                .iter()
                .map(|c| json!({"role": "user", "content": c}))
                .collect::<Vec<_>>()
        });
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "done"}}],
            "usage": {
                "prompt_tokens": prompt_tokens,
                "completion_tokens": completion_tokens,
                "total_tokens": prompt_tokens + completion_tokens
            }
        });

        let parsed = parse("openai", &request, Some(&response));
        prop_assert_eq!(parsed.messages.len(), contents.len() + 1);
        prop_assert_eq!(parsed.messages.last().unwrap().role, Role::Assistant);

        let usage = parsed.usage.unwrap();
        prop_assert_eq!(usage.prompt_tokens, prompt_tokens);
        prop_assert_eq!(usage.completion_tokens, completion_tokens);
        prop_assert_eq!(usage.total_tokens, prompt_tokens + completion_tokens);
    }

    /// Accumulating usage is a plain per-field sum.
    #[test]
    fn test_usage_accumulation_sums_fields(
        counts in prop::collection::vec((0u64..10_000, 0u64..10_000), 1..8),
    ) {
        let mut total = TokenUsage::default();
        for (prompt, completion) in &counts {
            total.accumulate(&TokenUsage::new(*prompt, *completion));
        }
        let prompt_sum: u64 = counts.iter().map(|(p, _)| p).sum();
        let completion_sum: u64 = counts.iter().map(|(_, c)| c).sum();
        prop_assert_eq!(total.prompt_tokens, prompt_sum);
        prop_assert_eq!(total.completion_tokens, completion_sum);
        prop_assert_eq!(total.total_tokens, prompt_sum + completion_sum);
    }

    /// Unknown wire roles degrade to user, never to a panic.
    #[test]
    fn test_role_from_wire_total(role in "[a-zA-Z_]{0,16}") {
        let parsed = Role::from_wire(&role);
        match role.to_lowercase().as_str() {
            "system" => prop_assert_eq!(parsed, Role::System),
            "user" => prop_assert_eq!(parsed, Role::User),
            "assistant" => prop_assert_eq!(parsed, Role::Assistant),
            "tool" | "function" => prop_assert_eq!(parsed, Role::Tool),
            _ => prop_assert_eq!(parsed, Role::User),
        }
    }
}
