//! Dynamic object graphs handed to the logger.
//!
//! A [`Value`] mirrors the shape of JSON, with two differences:
//!
//! - Containers are shared handles. Cloning a `Value::Object` or
//!   `Value::Array` clones the handle, not the contents, so a graph can hold
//!   the same node in several places and can refer back to itself.
//! - [`Value::Opaque`] wraps a foreign value that is never traversed. It is
//!   serialized when the graph is converted to JSON, and when the logger
//!   copies it into a record, so that its contents are redacted.
//!
//! Graphs are single-threaded (`Rc`). The logger converts them to
//! `serde_json::Value` before anything crosses a thread boundary.

use std::{
    cell::RefCell,
    collections::HashSet,
    fmt,
    rc::Rc,
};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::redaction::{CIRCULAR_PLACEHOLDER, DEFAULT_MAX_DEPTH};

/// Placeholder written when an opaque leaf cannot be serialized.
pub const UNSERIALIZABLE_PLACEHOLDER: &str = "Object cannot be serialized.";

/// Insertion-ordered mapping node contents.
pub type Map = IndexMap<String, Value>;

/// Shared, mutable container node.
pub type Node<T> = Rc<RefCell<T>>;

/// A foreign value carried through the graph as an untraversed leaf.
pub trait Opaque: fmt::Debug {
    /// Converts the value into JSON for output.
    fn to_json(&self) -> Result<JsonValue, serde_json::Error>;
}

impl<T> Opaque for T
where
    T: Serialize + fmt::Debug,
{
    fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// A node or leaf of an object graph.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Node<Vec<Value>>),
    Object(Node<Map>),
    Opaque(Rc<dyn Opaque>),
}

/// A property to strip from a graph: a mapping key or a sequence index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Key(String),
    Index(usize),
}

impl From<&str> for PropertyId {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PropertyId {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PropertyId {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl Value {
    /// Creates an empty mapping node.
    #[must_use]
    pub fn object() -> Self {
        Self::Object(Rc::new(RefCell::new(Map::new())))
    }

    /// Creates an empty sequence node.
    #[must_use]
    pub fn array() -> Self {
        Self::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// Builds a mapping node from key/value pairs.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map: Map = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::Object(Rc::new(RefCell::new(map)))
    }

    /// Builds a sequence node from values.
    pub fn from_items<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        Self::Array(Rc::new(RefCell::new(items)))
    }

    /// Wraps a foreign value as an opaque leaf.
    pub fn opaque<T>(value: T) -> Self
    where
        T: Serialize + fmt::Debug + 'static,
    {
        Self::Opaque(Rc::new(value))
    }

    /// Serializes `value` into a fresh, acyclic graph.
    ///
    /// Serialization failures produce [`UNSERIALIZABLE_PLACEHOLDER`] instead of
    /// an error.
    pub fn from_serialize<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value).map_or_else(
            |_| Self::String(UNSERIALIZABLE_PLACEHOLDER.to_owned()),
            Self::from,
        )
    }

    /// Returns `true` for mapping and sequence nodes.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Identity of a container node, used for cycle and sharing detection.
    pub(crate) fn node_id(&self) -> Option<usize> {
        match self {
            Self::Object(node) => Some(Rc::as_ptr(node).cast::<()>() as usize),
            Self::Array(node) => Some(Rc::as_ptr(node).cast::<()>() as usize),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same container node.
    pub fn same_node(&self, other: &Value) -> bool {
        match (self.node_id(), other.node_id()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    /// A new empty container of the same kind, or a clone for leaves.
    pub(crate) fn empty_like(&self) -> Self {
        match self {
            Self::Object(_) => Self::object(),
            Self::Array(_) => Self::array(),
            leaf => leaf.clone(),
        }
    }

    /// Looks up a mapping entry or sequence element.
    ///
    /// Sequence elements are addressed by their decimal index.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Object(node) => node.try_borrow().ok()?.get(key).cloned(),
            Self::Array(node) => {
                let index: usize = key.parse().ok()?;
                node.try_borrow().ok()?.get(index).cloned()
            }
            _ => None,
        }
    }

    /// Inserts an entry into a mapping node. Returns `false` for anything else.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Self::Object(node) => node.try_borrow_mut().map_or(false, |mut map| {
                map.insert(key.into(), value.into());
                true
            }),
            _ => false,
        }
    }

    /// Appends to a sequence node. Returns `false` for anything else.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match self {
            Self::Array(node) => node.try_borrow_mut().map_or(false, |mut items| {
                items.push(value.into());
                true
            }),
            _ => false,
        }
    }

    /// Number of entries or elements; zero for leaves.
    pub fn len(&self) -> usize {
        match self {
            Self::Object(node) => node.try_borrow().map_or(0, |map| map.len()),
            Self::Array(node) => node.try_borrow().map_or(0, |items| items.len()),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a mapping node's entries. Empty for anything else.
    pub(crate) fn entries(&self) -> Vec<(String, Value)> {
        match self {
            Self::Object(node) => node.try_borrow().map_or_else(
                |_| Vec::new(),
                |map| {
                    map.iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect()
                },
            ),
            _ => Vec::new(),
        }
    }

    /// Snapshot of a sequence node's elements. Empty for anything else.
    pub(crate) fn items(&self) -> Vec<Value> {
        match self {
            Self::Array(node) => node
                .try_borrow()
                .map_or_else(|_| Vec::new(), |items| items.clone()),
            _ => Vec::new(),
        }
    }

    /// Converts the graph into JSON.
    ///
    /// A node reached again from inside its own subtree is written as
    /// `"[Circular]"`. Shared but acyclic nodes are written at every position.
    /// Opaque leaves that fail to serialize become
    /// [`UNSERIALIZABLE_PLACEHOLDER`]. Containers at [`DEFAULT_MAX_DEPTH`] or
    /// deeper are written empty.
    pub fn to_json(&self) -> JsonValue {
        self.to_json_bounded(DEFAULT_MAX_DEPTH)
    }

    pub(crate) fn to_json_bounded(&self, max_depth: usize) -> JsonValue {
        let mut writer = JsonWriter {
            max_depth,
            ancestors: HashSet::new(),
        };
        writer.write(self, 0)
    }
}

struct JsonWriter {
    max_depth: usize,
    ancestors: HashSet<usize>,
}

impl JsonWriter {
    fn write(&mut self, value: &Value, depth: usize) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(flag) => JsonValue::Bool(*flag),
            Value::Number(number) => JsonValue::Number(number.clone()),
            Value::String(text) => JsonValue::String(text.clone()),
            Value::Opaque(opaque) => opaque
                .to_json()
                .unwrap_or_else(|_| JsonValue::String(UNSERIALIZABLE_PLACEHOLDER.to_owned())),
            Value::Object(_) | Value::Array(_) => {
                let Some(id) = value.node_id() else {
                    return JsonValue::Null;
                };
                if self.ancestors.contains(&id) {
                    return JsonValue::String(CIRCULAR_PLACEHOLDER.to_owned());
                }
                if depth >= self.max_depth {
                    return if value.is_array() {
                        JsonValue::Array(Vec::new())
                    } else {
                        JsonValue::Object(JsonMap::new())
                    };
                }
                self.ancestors.insert(id);
                let json = if value.is_array() {
                    JsonValue::Array(
                        value
                            .items()
                            .iter()
                            .map(|item| self.write(item, depth + 1))
                            .collect(),
                    )
                } else {
                    let mut map = JsonMap::new();
                    for (key, child) in value.entries() {
                        let child = self.write(&child, depth + 1);
                        map.insert(key, child);
                    }
                    JsonValue::Object(map)
                };
                self.ancestors.remove(&id);
                json
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque(opaque) => f.debug_tuple("Opaque").field(opaque).finish(),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(flag) => Self::Bool(flag),
            JsonValue::Number(number) => Self::Number(number),
            JsonValue::String(text) => Self::String(text),
            JsonValue::Array(items) => Self::from_items(items),
            JsonValue::Object(map) => Self::from_entries(map),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(number: $ty) -> Self {
                    Self::Number(Number::from(number))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Number::from_f64(number).map_or(Self::Null, Self::Number)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
