//! Leveled logger facade.
//!
//! Every call goes through the same pipeline before any sink sees it:
//!
//! 1. drop it if it is below the mode's minimum level;
//! 2. copy the caller's data into a working graph owned by this call,
//!    serializing opaque leaves so their contents are classified too;
//! 3. attach the error detail under `additionalInfo.error`;
//! 4. rewrite the working graph with the [`Classifier`];
//! 5. convert it to JSON and hand the [`LogRecord`] to every sink.
//!
//! The caller's graph is never mutated, and no step can fail or panic from
//! the caller's point of view.

mod config;
mod record;
mod sink;

use std::fmt;

use chrono::{Local, SecondsFormat};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub use config::{LoggerConfig, LoggingMode, OverrideDefault, DEFAULT_SECTION_SEPARATOR};
pub use record::{Level, LogRecord};
pub use sink::{render_console, ConsoleSink, MemorySink, Sink, UNSTRINGIFIABLE_PLACEHOLDER};

use crate::{
    classification::Classifier,
    error::ErrorDetail,
    graph::Value,
    redaction::{traverse_and_mutate, working_copy, DEFAULT_MAX_DEPTH},
};

/// Data keys the facade owns; callers cannot overwrite them.
const RESERVED_KEYS: &[&str] = &["level", "timestamp"];

/// Redacting, leveled logger.
///
/// Construct one per application and pass it to the code that logs. Sinks are
/// attached during setup (`&mut self`); afterwards the logger is shared
/// read-only and is `Send + Sync`.
///
/// ```
/// use audit_trail::{Logger, LoggerConfig, LoggingMode, MemorySink, Value};
///
/// let sink = MemorySink::new();
/// let mut logger = Logger::silent(LoggingMode::Production);
/// logger.add_sink(sink.clone());
///
/// let data = Value::from_entries([("user", "alice"), ("password", "hunter2")]);
/// logger.info("signed in", Some(&data));
///
/// let record = sink.last().unwrap();
/// assert_eq!(record.field("password").unwrap(), "[REDACTED]");
/// assert_eq!(data.get("password").unwrap().as_str(), Some("hunter2"));
/// ```
pub struct Logger {
    mode: LoggingMode,
    min_level: Level,
    classifier: Classifier,
    max_depth: usize,
    sinks: Vec<Box<dyn Sink>>,
}

impl Logger {
    /// Builds a logger with the sinks `config` implies.
    pub fn new(config: &LoggerConfig) -> Self {
        let mut logger = Self::silent(config.mode);
        if config.writes_to_console() {
            logger.add_sink(
                ConsoleSink::stdout().with_separator(config.override_default.section_separator()),
            );
        }
        logger
    }

    /// Logger with the level threshold of `mode` and no sinks.
    pub fn silent(mode: LoggingMode) -> Self {
        Self {
            mode,
            min_level: mode.min_level(),
            classifier: Classifier::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            sinks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Bounds both the working copy and the redaction walk.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn add_sink(&mut self, sink: impl Sink + 'static) -> &mut Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn mode(&self) -> LoggingMode {
        self.mode
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    pub fn debug(&self, message: &str, data: Option<&Value>) -> &Self {
        self.log(Level::Debug, message, None, data)
    }

    pub fn info(&self, message: &str, data: Option<&Value>) -> &Self {
        self.log(Level::Info, message, None, data)
    }

    pub fn warn(&self, message: &str, error: Option<&ErrorDetail>, data: Option<&Value>) -> &Self {
        self.log(Level::Warn, message, error, data)
    }

    pub fn error(&self, message: &str, error: Option<&ErrorDetail>, data: Option<&Value>) -> &Self {
        self.log(Level::Error, message, error, data)
    }

    /// Logs at `level`.
    ///
    /// `data` is copied, never mutated. A mapping contributes its entries as
    /// top-level fields; any other value is logged under `data`. A string
    /// `message` entry is appended to `message` and the `level` and
    /// `timestamp` entries are ignored.
    pub fn log(
        &self,
        level: Level,
        message: &str,
        error: Option<&ErrorDetail>,
        data: Option<&Value>,
    ) -> &Self {
        if !self.enabled(level) || self.sinks.is_empty() {
            return self;
        }
        let record = self.build_record(level, message, error, data);
        for sink in &self.sinks {
            sink.write(&record);
        }
        self
    }

    fn build_record(
        &self,
        level: Level,
        message: &str,
        error: Option<&ErrorDetail>,
        data: Option<&Value>,
    ) -> LogRecord {
        let working = Value::object();
        let mut text = message.to_owned();
        working.insert("message", text.as_str());

        if let Some(data) = data.filter(|data| !data.is_null()) {
            let copy = working_copy(data, self.max_depth);
            if copy.is_container() && !copy.is_array() {
                for (key, value) in copy.entries() {
                    if key == "message" {
                        if let Some(extra) = value.as_str() {
                            text.push(' ');
                            text.push_str(extra);
                            working.insert("message", text.as_str());
                        }
                    } else if !RESERVED_KEYS.contains(&key.as_str()) {
                        working.insert(key, value);
                    }
                }
            } else {
                working.insert("data", copy);
            }
        }

        if let Some(error) = error {
            attach_error(&working, error, self.max_depth);
        }

        let classifier = &self.classifier;
        let redacted = traverse_and_mutate(
            working,
            |key, value| classifier.apply(key, value),
            self.max_depth,
        );
        let mut message = text;
        let mut fields = JsonMap::new();
        if let JsonValue::Object(map) = redacted.to_json_bounded(self.max_depth) {
            for (key, value) in map {
                if key == "message" {
                    message = match value {
                        JsonValue::String(redacted) => redacted,
                        other => other.to_string(),
                    };
                } else {
                    fields.insert(key, value);
                }
            }
        }

        LogRecord {
            level,
            message,
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
            fields,
        }
    }
}

/// Merges the error detail into the `additionalInfo` mapping, keeping any
/// entries the caller already put there.
///
/// Custom error fields may share nodes with caller data, so the detail is
/// copied like the rest of the record.
fn attach_error(working: &Value, error: &ErrorDetail, max_depth: usize) {
    let info = Value::object();
    if let Some(existing) = working.get("additionalInfo") {
        for (key, value) in existing.entries() {
            info.insert(key, value);
        }
    }
    info.insert("error", working_copy(&error.to_value(), max_depth));
    working.insert("additionalInfo", info);
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("mode", &self.mode)
            .field("min_level", &self.min_level)
            .field("classifier", &self.classifier)
            .field("max_depth", &self.max_depth)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
