//! Copy-on-write removal of named properties.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde_json::Value as JsonValue;

use super::policy::REDACTED_PLACEHOLDER;
use crate::graph::{PropertyId, Value, UNSERIALIZABLE_PLACEHOLDER};

/// Returns a copy of `graph` with the listed properties stripped at any depth.
///
/// - A mapping entry whose key is listed keeps its key and has its value
///   replaced with [`REDACTED_PLACEHOLDER`].
/// - A sequence element whose original index is listed is dropped, shifting
///   later elements down.
/// - Everything else is copied. Shared nodes and cycles in `graph` are
///   reproduced in the copy, which never aliases the input.
///
/// Ids that match nothing are ignored, and an empty id list yields a plain
/// deep copy. The copy is built with an explicit work list, so its cost in
/// stack does not grow with the depth of `graph`.
pub fn redact_properties(properties: &[PropertyId], graph: &Value) -> Value {
    Copier::new(properties).copy(graph)
}

/// Deep copy of `graph` that preserves sharing and cycles.
pub fn deep_clone(graph: &Value) -> Value {
    Copier::new(&[]).copy(graph)
}

/// Copy of `graph` owned by a single log call.
///
/// Unlike [`deep_clone`], the result is a tree apart from its cycles: a node
/// shared by two branches is copied once per position, so rewriting or
/// truncating one position never shows up at another. Back edges to an
/// ancestor stay back edges. Opaque leaves are serialized into plain
/// subtrees (or [`UNSERIALIZABLE_PLACEHOLDER`]) so that their contents are
/// classified like any other data. Containers at `max_depth` or deeper are
/// replaced with empty ones.
pub(crate) fn working_copy(graph: &Value, max_depth: usize) -> Value {
    WorkingCopy {
        max_depth,
        ancestors: HashMap::new(),
    }
    .copy(graph, 0)
}

struct Copier<'a> {
    properties: &'a [PropertyId],
    /// Source node id -> its copy.
    copies: HashMap<usize, Value>,
    /// Source containers whose copies still need filling.
    pending: Vec<(Value, Value)>,
}

impl<'a> Copier<'a> {
    fn new(properties: &'a [PropertyId]) -> Self {
        Self {
            properties,
            copies: HashMap::new(),
            pending: Vec::new(),
        }
    }

    fn lists_key(&self, key: &str) -> bool {
        self.properties
            .iter()
            .any(|property| matches!(property, PropertyId::Key(listed) if listed == key))
    }

    fn lists_index(&self, index: usize) -> bool {
        self.properties.contains(&PropertyId::Index(index))
    }

    fn copy(mut self, graph: &Value) -> Value {
        let root = self.handle(graph);
        while let Some((source, target)) = self.pending.pop() {
            match &target {
                Value::Object(node) => {
                    for (key, child) in source.entries() {
                        let copied = if self.lists_key(&key) {
                            Value::String(REDACTED_PLACEHOLDER.to_owned())
                        } else {
                            self.handle(&child)
                        };
                        if let Ok(mut map) = node.try_borrow_mut() {
                            map.insert(key, copied);
                        }
                    }
                }
                Value::Array(node) => {
                    for (index, child) in source.items().iter().enumerate() {
                        if self.lists_index(index) {
                            continue;
                        }
                        let copied = self.handle(child);
                        if let Ok(mut items) = node.try_borrow_mut() {
                            items.push(copied);
                        }
                    }
                }
                _ => {}
            }
        }
        root
    }

    /// Copy of `value`. A container seen for the first time gets an empty
    /// copy that is queued for filling.
    fn handle(&mut self, value: &Value) -> Value {
        let Some(id) = value.node_id() else {
            return value.clone();
        };
        if let Some(copy) = self.copies.get(&id) {
            return copy.clone();
        }
        let copy = value.empty_like();
        self.copies.insert(id, copy.clone());
        self.pending.push((value.clone(), copy.clone()));
        copy
    }
}

struct WorkingCopy {
    max_depth: usize,
    /// Source ids on the current path -> their copies.
    ancestors: HashMap<usize, Value>,
}

impl WorkingCopy {
    fn copy(&mut self, value: &Value, depth: usize) -> Value {
        if let Value::Opaque(opaque) = value {
            return opaque.to_json().map_or_else(
                |_| Value::String(UNSERIALIZABLE_PLACEHOLDER.to_owned()),
                |json| self.expand(json, depth),
            );
        }
        let Some(id) = value.node_id() else {
            return value.clone();
        };
        if let Some(copy) = self.ancestors.get(&id) {
            return copy.clone();
        }
        if depth >= self.max_depth {
            return value.empty_like();
        }
        let copy = value.empty_like();
        self.ancestors.insert(id, copy.clone());
        match &copy {
            Value::Object(node) => {
                for (key, child) in value.entries() {
                    let copied = self.copy(&child, depth + 1);
                    if let Ok(mut map) = node.try_borrow_mut() {
                        map.insert(key, copied);
                    }
                }
            }
            Value::Array(node) => {
                for child in value.items() {
                    let copied = self.copy(&child, depth + 1);
                    if let Ok(mut items) = node.try_borrow_mut() {
                        items.push(copied);
                    }
                }
            }
            _ => {}
        }
        self.ancestors.remove(&id);
        copy
    }

    /// Serialized opaque contents, truncated like the rest of the copy.
    fn expand(&self, json: JsonValue, depth: usize) -> Value {
        match json {
            JsonValue::Object(entries) if depth < self.max_depth => Value::Object(Rc::new(
                RefCell::new(
                    entries
                        .into_iter()
                        .map(|(key, child)| (key, self.expand(child, depth + 1)))
                        .collect(),
                ),
            )),
            JsonValue::Array(items) if depth < self.max_depth => Value::Array(Rc::new(
                RefCell::new(
                    items
                        .into_iter()
                        .map(|child| self.expand(child, depth + 1))
                        .collect(),
                ),
            )),
            JsonValue::Object(_) => Value::object(),
            JsonValue::Array(_) => Value::array(),
            leaf => Value::from(leaf),
        }
    }
}
