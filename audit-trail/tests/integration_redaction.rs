//! End-to-end tests for the graph redaction API.
//!
//! These tests exercise:
//! - property removal on copies (`redact_properties`),
//! - in-place rewriting with cycle and depth guards (`traverse_and_mutate`), and
//! - the classifier used as a traversal callback.

use audit_trail::{
    deep_clone, redact_properties, traverse_and_mutate, Classifier, PropertyId, Value,
    BATCH_PLACEHOLDER, CIRCULAR_PLACEHOLDER, DEFAULT_MAX_DEPTH, REDACTED_PLACEHOLDER,
};
use serde_json::json;

fn identity(_key: &str, value: Value) -> Value {
    value
}

// ============================================================================
// redact_properties
// ============================================================================

#[test]
fn test_redact_properties_never_touches_the_input() {
    let graph = Value::from(json!({
        "key1": "a",
        "key2": {"key3": {"key4": "b"}},
        "rows": [{"key1": "x"}, {"key1": "y"}]
    }));
    let before = graph.to_json();
    let rows = graph.get("rows").unwrap();

    let redacted = redact_properties(
        &[PropertyId::from("key1"), PropertyId::from("key3"), PropertyId::Index(0)],
        &graph,
    );

    assert_eq!(graph.to_json(), before);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        redacted.to_json(),
        json!({
            "key1": "[REDACTED]",
            "key2": {"key3": "[REDACTED]"},
            "rows": [{"key1": "[REDACTED]"}]
        })
    );
}

#[test]
fn test_redact_properties_with_no_ids_is_a_clone() {
    let graph = Value::from(json!({"a": [1, {"b": null}], "c": true}));
    let copy = redact_properties(&[], &graph);
    assert_eq!(copy.to_json(), graph.to_json());
    assert!(!copy.same_node(&graph));
    assert!(!copy.get("a").unwrap().same_node(&graph.get("a").unwrap()));
}

#[test]
fn test_redact_properties_removes_index_and_shifts() {
    let graph = Value::from(json!([
        {"key1": "a", "key2": "x"},
        {"key1": "b", "key2": "y"},
        {"key1": "c", "key2": "z"}
    ]));
    let redacted = redact_properties(&[PropertyId::Index(1), PropertyId::from("key1")], &graph);
    assert_eq!(redacted.len(), graph.len() - 1);
    assert_eq!(
        redacted.to_json(),
        json!([
            {"key1": "[REDACTED]", "key2": "x"},
            {"key1": "[REDACTED]", "key2": "z"}
        ])
    );
}

#[test]
fn test_redact_properties_keeps_cycles_in_the_copy() {
    let graph = Value::from_entries([("token", "abc")]);
    graph.insert("self", graph.clone());

    let redacted = redact_properties(&[PropertyId::from("token")], &graph);

    assert_eq!(
        redacted.get("token").unwrap().as_str(),
        Some(REDACTED_PLACEHOLDER)
    );
    assert!(redacted.get("self").unwrap().same_node(&redacted));
    assert_eq!(graph.get("token").unwrap().as_str(), Some("abc"));
}

// ============================================================================
// traverse_and_mutate
// ============================================================================

#[test]
fn test_traverse_terminates_on_self_reference() {
    let graph = Value::from_entries([("a", 1)]);
    graph.insert("b", graph.clone());
    let result = traverse_and_mutate(graph, identity, DEFAULT_MAX_DEPTH);
    assert_eq!(result.to_json(), json!({"a": 1, "b": CIRCULAR_PLACEHOLDER}));
}

#[test]
fn test_traverse_truncates_instead_of_failing() {
    let graph = Value::from(json!({"a": {"b": {"c": {"d": 1}}}}));
    let result = traverse_and_mutate(graph, identity, 2);
    assert_eq!(result.to_json(), json!({"a": {"b": {}}}));
}

#[test]
fn test_traverse_on_a_copy_leaves_original_intact() {
    let original = Value::from(json!({"secret": 123, "layer1": {"nric": "T1234567Z"}}));
    let classifier = Classifier::default();

    let result = traverse_and_mutate(
        deep_clone(&original),
        |key, value| classifier.apply(key, value),
        DEFAULT_MAX_DEPTH,
    );

    assert_eq!(
        result.to_json(),
        json!({"secret": "[REDACTED]", "layer1": {"nric": "*****567Z"}})
    );
    assert_eq!(
        original.to_json(),
        json!({"secret": 123, "layer1": {"nric": "T1234567Z"}})
    );
}

#[test]
fn test_batch_arrays_are_never_masked_per_element() {
    let classifier = Classifier::default();
    let mut seen = Vec::new();
    let graph = Value::from(json!({"myUsersNRICs": ["T1234567Z", "S1234567Y"]}));

    let result = traverse_and_mutate(
        graph,
        |key, value| {
            seen.push(key.to_owned());
            classifier.apply(key, value)
        },
        DEFAULT_MAX_DEPTH,
    );

    assert_eq!(result.to_json(), json!({"myUsersNRICs": BATCH_PLACEHOLDER}));
    assert_eq!(seen, ["myUsersNRICs"]);
}

#[test]
fn test_opaque_leaves_are_not_traversed() {
    #[derive(Debug, serde::Serialize)]
    struct Session {
        token: String,
    }

    let graph = Value::from_entries([(
        "session",
        Value::opaque(Session {
            token: "raw".into(),
        }),
    )]);
    let mut keys = Vec::new();
    let result = traverse_and_mutate(
        graph,
        |key, value| {
            keys.push(key.to_owned());
            value
        },
        DEFAULT_MAX_DEPTH,
    );

    assert_eq!(keys, ["session"]);
    assert_eq!(result.to_json(), json!({"session": {"token": "raw"}}));
}
