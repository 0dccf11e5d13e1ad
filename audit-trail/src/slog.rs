//! Forwarding redacted records to `slog`.
//!
//! [`SlogSink`] emits each record at the matching `slog` level with the
//! record's message as the `slog` message and the whole record, as JSON, under
//! the `record` key. The JSON goes through `slog`'s nested-value support, so
//! structured drains keep it structured.
//!
//! The sink only ever sees records the [`crate::Logger`] has already
//! redacted. It does not configure `slog` or its drains.
//!
//! ## Example
//! ```ignore
//! use audit_trail::{slog::SlogSink, Logger, LoggingMode};
//!
//! let mut logger = Logger::silent(LoggingMode::Production);
//! logger.add_sink(SlogSink::new(root.new(slog::o!("component" => "audit"))));
//! ```

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::logger::{Level, LogRecord, Sink};

/// Key under which the full record is emitted.
pub const RECORD_KEY: &str = "record";

/// A `slog::Value` that emits an owned JSON payload as a nested value.
pub struct RecordJson {
    value: JsonValue,
}

impl RecordJson {
    pub fn new(value: JsonValue) -> Self {
        Self { value }
    }
}

impl SlogValue for RecordJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Sink that writes to a `slog::Logger`.
#[derive(Clone, Debug)]
pub struct SlogSink {
    logger: slog::Logger,
}

impl SlogSink {
    pub fn new(logger: slog::Logger) -> Self {
        Self { logger }
    }
}

impl Sink for SlogSink {
    fn write(&self, record: &LogRecord) {
        let payload = RecordJson::new(record.to_json());
        let message = record.message.as_str();
        match record.level {
            Level::Debug => slog::debug!(self.logger, "{}", message; RECORD_KEY => payload),
            Level::Info => slog::info!(self.logger, "{}", message; RECORD_KEY => payload),
            Level::Warn => slog::warn!(self.logger, "{}", message; RECORD_KEY => payload),
            Level::Error => slog::error!(self.logger, "{}", message; RECORD_KEY => payload),
        }
    }
}
