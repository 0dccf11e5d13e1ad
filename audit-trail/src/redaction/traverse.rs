//! In-place value substitution over an object graph.

use std::collections::HashSet;

use crate::graph::Value;

/// Default bound on traversal depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Marker written in place of a node that is its own ancestor.
pub const CIRCULAR_PLACEHOLDER: &str = "[Circular]";

/// Walks `graph` and rewrites its values through `callback`.
///
/// - Sequences and leaves stored in a container are passed to
///   `callback(key, value)` and replaced by its result. Sequence elements use
///   their decimal index as the key. Mapping nodes are always walked, never
///   handed to the callback.
/// - Containers (as stored, or as returned by the callback) are walked in
///   turn. A container that is an ancestor of the current position is
///   replaced with [`CIRCULAR_PLACEHOLDER`]. A node shared between sibling
///   branches is not a cycle and is walked at every position.
/// - The root sits at depth 0. A container that would sit at `max_depth` or
///   deeper is replaced with an empty container of the same kind.
///
/// The graph is mutated through its shared handles and returned. Clone it
/// first (see [`crate::deep_clone`]) to keep the original intact. Leaf roots,
/// including `Value::Null`, are returned unchanged. A node held at several
/// positions is rewritten in place, so truncation at its deepest position is
/// visible at the others.
pub fn traverse_and_mutate<F>(graph: Value, callback: F, max_depth: usize) -> Value
where
    F: FnMut(&str, Value) -> Value,
{
    if !graph.is_container() {
        return graph;
    }
    let mut walker = Walker {
        callback,
        max_depth,
        ancestors: HashSet::new(),
    };
    walker.walk(&graph, 0);
    graph
}

struct Walker<F> {
    callback: F,
    max_depth: usize,
    ancestors: HashSet<usize>,
}

impl<F> Walker<F>
where
    F: FnMut(&str, Value) -> Value,
{
    fn walk(&mut self, node: &Value, depth: usize) {
        let Some(id) = node.node_id() else {
            return;
        };
        self.ancestors.insert(id);
        match node {
            Value::Object(map) => {
                // Borrows are taken per entry so the callback may read the graph.
                let keys: Vec<String> = node.entries().into_iter().map(|(key, _)| key).collect();
                for key in keys {
                    let Some(child) = node.get(&key) else {
                        continue;
                    };
                    let next = self.visit(&key, child, depth + 1);
                    if let Ok(mut entries) = map.try_borrow_mut() {
                        entries.insert(key, next);
                    }
                }
            }
            Value::Array(items) => {
                let len = node.len();
                for index in 0..len {
                    let key = index.to_string();
                    let Some(child) = node.get(&key) else {
                        break;
                    };
                    let next = self.visit(&key, child, depth + 1);
                    if let Ok(mut elements) = items.try_borrow_mut() {
                        if let Some(slot) = elements.get_mut(index) {
                            *slot = next;
                        }
                    }
                }
            }
            _ => {}
        }
        self.ancestors.remove(&id);
    }

    fn visit(&mut self, key: &str, child: Value, depth: usize) -> Value {
        if self.is_ancestor(&child) {
            return Value::String(CIRCULAR_PLACEHOLDER.to_owned());
        }
        let next = match child {
            Value::Object(_) => child,
            other => (self.callback)(key, other),
        };
        if !next.is_container() {
            return next;
        }
        if self.is_ancestor(&next) {
            return Value::String(CIRCULAR_PLACEHOLDER.to_owned());
        }
        if depth >= self.max_depth {
            return next.empty_like();
        }
        self.walk(&next, depth);
        next
    }

    fn is_ancestor(&self, value: &Value) -> bool {
        value
            .node_id()
            .is_some_and(|id| self.ancestors.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{traverse_and_mutate, CIRCULAR_PLACEHOLDER, DEFAULT_MAX_DEPTH};
    use crate::graph::Value;

    fn increment(_key: &str, value: Value) -> Value {
        match &value {
            Value::Number(number) => number.as_i64().map_or(value.clone(), |n| Value::from(n + 1)),
            _ => value,
        }
    }

    #[test]
    fn rewrites_every_leaf() {
        let graph = Value::from(json!({"a": 1, "b": 2}));
        let result = traverse_and_mutate(graph, increment, DEFAULT_MAX_DEPTH);
        assert_eq!(result.to_json(), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn rewrites_nested_leaves() {
        let graph = Value::from(json!({"a": 1, "b": {"c": 2, "d": [3, {"e": 4}]}}));
        let result = traverse_and_mutate(graph, increment, DEFAULT_MAX_DEPTH);
        assert_eq!(result.to_json(), json!({"a": 2, "b": {"c": 3, "d": [4, {"e": 5}]}}));
    }

    #[test]
    fn mutates_and_returns_the_given_graph() {
        let graph = Value::from(json!({"a": 1}));
        let result = traverse_and_mutate(graph.clone(), increment, DEFAULT_MAX_DEPTH);
        assert!(result.same_node(&graph));
        assert_eq!(graph.to_json(), json!({"a": 2}));
    }

    #[test]
    fn truncates_beyond_max_depth() {
        let graph = Value::from(json!({"a": {"b": {"c": {"d": 1}}}}));
        let result = traverse_and_mutate(graph, |_, v| v, 2);
        assert_eq!(result.to_json(), json!({"a": {"b": {}}}));
    }

    #[test]
    fn processes_at_max_depth_but_not_beyond() {
        let graph = Value::from(json!({"a": {"b": {"c": 1}}}));
        let result = traverse_and_mutate(graph, increment, 3);
        assert_eq!(result.to_json(), json!({"a": {"b": {"c": 2}}}));
    }

    #[test]
    fn truncated_arrays_stay_arrays() {
        let graph = Value::from(json!({"a": [[1, 2]]}));
        let result = traverse_and_mutate(graph, |_, v| v, 2);
        assert_eq!(result.to_json(), json!({"a": [[]]}));
    }

    #[test]
    fn replaces_self_reference_with_marker() {
        let graph = Value::from_entries([("a", 1)]);
        graph.insert("b", graph.clone());
        let result = traverse_and_mutate(graph, |_, v| v, DEFAULT_MAX_DEPTH);
        assert_eq!(result.to_json(), json!({"a": 1, "b": CIRCULAR_PLACEHOLDER}));
    }

    #[test]
    fn replaces_indirect_cycles_inside_arrays() {
        let graph = Value::from_entries([("name", "root")]);
        let list = Value::from_items([graph.clone(), Value::from(1)]);
        graph.insert("list", list);
        let result = traverse_and_mutate(graph, |_, v| v, DEFAULT_MAX_DEPTH);
        assert_eq!(
            result.to_json(),
            json!({"name": "root", "list": [CIRCULAR_PLACEHOLDER, 1]})
        );
    }

    #[test]
    fn walks_shared_siblings_each_time() {
        let shared = Value::from_entries([("x", 1)]);
        let graph = Value::from_entries([("left", shared.clone()), ("right", shared)]);
        let mut visits = 0;
        traverse_and_mutate(
            graph.clone(),
            |key, value| {
                if key == "x" {
                    visits += 1;
                }
                value
            },
            DEFAULT_MAX_DEPTH,
        );
        assert_eq!(visits, 2);
        assert_eq!(graph.to_json(), json!({"left": {"x": 1}, "right": {"x": 1}}));
    }

    #[test]
    fn passes_null_leaves_to_callback() {
        let graph = Value::from(json!({"a": null, "b": 2}));
        let result = traverse_and_mutate(
            graph,
            |_, v| if v.is_null() { Value::from("was null") } else { v },
            DEFAULT_MAX_DEPTH,
        );
        assert_eq!(result.to_json(), json!({"a": "was null", "b": 2}));
    }

    #[test]
    fn hands_arrays_to_callback_and_walks_the_result() {
        let graph = Value::from(json!({"hidden": [1, 2], "shown": [1, 2]}));
        let result = traverse_and_mutate(
            graph,
            |key, v| {
                if key == "hidden" {
                    Value::from("gone")
                } else {
                    increment(key, v)
                }
            },
            DEFAULT_MAX_DEPTH,
        );
        assert_eq!(result.to_json(), json!({"hidden": "gone", "shown": [2, 3]}));
    }

    #[test]
    fn leaf_roots_are_returned_unchanged() {
        assert!(traverse_and_mutate(Value::Null, |_, _| Value::from(1), 5).is_null());
        let text = traverse_and_mutate(Value::from("x"), |_, _| Value::from(1), 5);
        assert_eq!(text.as_str(), Some("x"));
    }

    #[test]
    fn deep_acyclic_chain_is_bounded() {
        let root = Value::object();
        let mut cursor = root.clone();
        for _ in 0..1_000 {
            let next = Value::object();
            cursor.insert("next", next.clone());
            cursor = next;
        }
        let result = traverse_and_mutate(root, |_, v| v, DEFAULT_MAX_DEPTH);
        let mut depth = 0;
        let mut cursor = result;
        while let Some(next) = cursor.get("next") {
            depth += 1;
            cursor = next;
        }
        assert_eq!(depth, DEFAULT_MAX_DEPTH);
    }
}
