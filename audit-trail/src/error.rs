//! Error values carried into log records, and the crate's own errors.

use std::{backtrace::Backtrace, backtrace::BacktraceStatus, error::Error as StdError};

use indexmap::IndexMap;

use crate::{graph::Value, redaction::DEFAULT_MAX_DEPTH};

/// Errors raised while building logger configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown logging mode `{0}` (expected LOCAL, DEV or PRODUCTION)")]
    UnknownMode(String),
}

/// Structured description of an error, ready to be attached to a record.
///
/// Renders as `{message, name, stack?, <fields>..., cause?}` under
/// `additionalInfo.error`.
#[derive(Clone, Debug)]
pub struct ErrorDetail {
    pub message: String,
    pub name: String,
    pub stack: Option<String>,
    pub fields: IndexMap<String, Value>,
    pub cause: Option<Box<ErrorDetail>>,
}

impl ErrorDetail {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            name: name.into(),
            stack: None,
            fields: IndexMap::new(),
            cause: None,
        }
    }

    /// Builds a detail from any error, following its `source()` chain into
    /// nested causes.
    ///
    /// The name is the error's type name without its module path. A stack is
    /// attached when the environment enables backtrace capture.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let mut detail = Self::new(short_type_name::<E>(), error.to_string());
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            detail.stack = Some(backtrace.to_string());
        }
        detail.cause = error
            .source()
            .map(|source| Box::new(Self::from_source(source, 1)));
        detail
    }

    fn from_source(error: &(dyn StdError + 'static), depth: usize) -> Self {
        let mut detail = Self::new("Error", error.to_string());
        if depth < DEFAULT_MAX_DEPTH {
            detail.cause = error
                .source()
                .map(|source| Box::new(Self::from_source(source, depth + 1)));
        }
        detail
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Adds a custom field rendered next to `message` and `name`.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ErrorDetail) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Renders the detail as a graph node.
    pub fn to_value(&self) -> Value {
        let node = Value::object();
        node.insert("message", self.message.as_str());
        node.insert("name", self.name.as_str());
        if let Some(stack) = &self.stack {
            node.insert("stack", stack.as_str());
        }
        for (key, value) in &self.fields {
            node.insert(key.as_str(), value.clone());
        }
        if let Some(cause) = &self.cause {
            node.insert("cause", cause.to_value());
        }
        node
    }
}

fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_owned()
}

/// Whatever a failed operation produced.
///
/// By convention this is an error, but bare strings and arbitrary values are
/// accepted so a failure can always be logged.
#[derive(Clone, Debug)]
pub enum FailureCause {
    Structured(ErrorDetail),
    Text(String),
    Opaque(Value),
}

impl FailureCause {
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        Self::Structured(ErrorDetail::from_error(error))
    }
}

impl From<ErrorDetail> for FailureCause {
    fn from(detail: ErrorDetail) -> Self {
        Self::Structured(detail)
    }
}

impl From<String> for FailureCause {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FailureCause {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for FailureCause {
    fn from(value: Value) -> Self {
        Self::Opaque(value)
    }
}
