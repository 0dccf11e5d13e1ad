use std::fmt;

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Severity of a record, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A redacted record as delivered to sinks.
///
/// Serializes flat: `level`, `message` and `timestamp` followed by the
/// caller's fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub fields: JsonMap<String, JsonValue>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Returns `true` for records produced by the audit assembler.
    pub fn is_audit(&self) -> bool {
        self.fields
            .get("trxCategory")
            .is_some_and(|category| !category.is_null())
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::with_capacity(self.fields.len() + 3);
        map.insert("level".into(), JsonValue::from(self.level.as_str()));
        map.insert("message".into(), JsonValue::from(self.message.as_str()));
        map.insert("timestamp".into(), JsonValue::from(self.timestamp.as_str()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        JsonValue::Object(map)
    }
}
