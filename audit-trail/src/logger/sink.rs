//! Destinations for redacted records.
//!
//! A [`Sink`] only ever sees records that have already been redacted and
//! converted to JSON. Sinks cannot fail from the logger's point of view: write
//! errors are swallowed so a broken destination never reaches the caller.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map as JsonMap, Value as JsonValue};

use super::{config::DEFAULT_SECTION_SEPARATOR, LogRecord};

/// Written in place of a section that cannot be rendered.
pub const UNSTRINGIFIABLE_PLACEHOLDER: &str = "Object cannot be stringified.";

/// A destination for redacted records.
pub trait Sink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

impl<F> Sink for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn write(&self, record: &LogRecord) {
        self(record);
    }
}

/// Human-readable console output.
///
/// Plain records render as
/// `[timestamp][LEVEL][message][data]` then `[additionalInfo]`. Audit records
/// render as
/// `[timestamp][LEVEL][CATEGORY][module][trxId][name][STATUS][Nms][message]`
/// then `[userToken]`, `[additionalInfo]` and an optional `[filename]`.
/// Sections are joined by the separator, which also replaces newlines inside
/// the one-space-indented JSON.
pub struct ConsoleSink<W = io::Stdout> {
    writer: Mutex<W>,
    separator: String,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> ConsoleSink<W>
where
    W: Write + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            separator: DEFAULT_SECTION_SEPARATOR.to_owned(),
        }
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> Sink for ConsoleSink<W>
where
    W: Write + Send,
{
    fn write(&self, record: &LogRecord) {
        let line = render_console(record, &self.separator);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

/// Renders `record` in the console layout.
pub fn render_console(record: &LogRecord, separator: &str) -> String {
    let mut out = format!(
        "[{}][{}]",
        record.timestamp,
        record.level.as_str().to_uppercase()
    );
    let additional_info = present(record, "additionalInfo")
        .map_or_else(|| "no additionalInfo".to_owned(), |info| pretty(info, separator));

    if !record.is_audit() {
        let data: JsonMap<String, JsonValue> = record
            .fields
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "additionalInfo" | "filename"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        out.push_str(&format!(
            "[{}][{}]{separator}[{additional_info}]{separator}",
            record.message,
            pretty(&JsonValue::Object(data), separator)
        ));
        return out;
    }

    let elapsed = present(record, "timeTakenInMillis")
        .map_or_else(|| "time taken is not tracked".to_owned(), |ms| format!("{}ms", plain(ms)));
    let user_token = present(record, "userToken")
        .map_or_else(|| "no user token".to_owned(), |token| pretty(token, separator));
    out.push_str(&format!(
        "[{}][{}][{}][{}][{}][{elapsed}][{}]{separator}[{user_token}]{separator}[{additional_info}]{separator}",
        text_field(record, "trxCategory"),
        text_field(record, "trxModule"),
        text_field(record, "trxId"),
        text_field(record, "trxName"),
        text_field(record, "trxStatus"),
        record.message,
    ));
    if let Some(filename) = present(record, "filename") {
        out.push_str(&format!("[{}]", plain(filename)));
    }
    out
}

fn present<'a>(record: &'a LogRecord, key: &str) -> Option<&'a JsonValue> {
    record.field(key).filter(|value| !value.is_null())
}

fn text_field(record: &LogRecord, key: &str) -> String {
    present(record, key).map(plain).unwrap_or_default()
}

fn plain(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &JsonValue, separator: &str) -> String {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b" "));
    if value.serialize(&mut serializer).is_err() {
        return UNSTRINGIFIABLE_PLACEHOLDER.to_owned();
    }
    String::from_utf8(buffer).map_or_else(
        |_| UNSTRINGIFIABLE_PLACEHOLDER.to_owned(),
        |text| text.replace("\\n", separator).replace('\n', separator),
    )
}

/// Collects records in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<LogRecord> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &LogRecord) {
        self.lock().push(record.clone());
    }
}
