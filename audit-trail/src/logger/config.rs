//! Logger configuration.
//!
//! The types derive `serde` so a configuration can be loaded from whatever
//! format the host application already uses:
//!
//! ```json
//! {
//!   "loggingMode": "DEV",
//!   "overrideDefault": { "alwaysWriteToConsole": true, "consoleLogSectionSeparator": " " }
//! }
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Level;
use crate::error::ConfigError;

/// Default string written between console record sections.
pub const DEFAULT_SECTION_SEPARATOR: &str = "\n";

/// Deployment mode, which fixes the minimum level and the default sinks.
///
/// | mode         | minimum level | console sink by default |
/// |--------------|---------------|-------------------------|
/// | `LOCAL`      | debug         | yes                     |
/// | `DEV`        | info          | yes                     |
/// | `PRODUCTION` | info          | no                      |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoggingMode {
    Local,
    Dev,
    #[default]
    Production,
}

impl LoggingMode {
    pub fn min_level(self) -> Level {
        match self {
            Self::Local => Level::Debug,
            Self::Dev | Self::Production => Level::Info,
        }
    }

    pub fn writes_to_console_by_default(self) -> bool {
        !matches!(self, Self::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Dev => "DEV",
            Self::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for LoggingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggingMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOCAL" => Ok(Self::Local),
            "DEV" => Ok(Self::Dev),
            "PRODUCTION" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownMode(value.to_owned())),
        }
    }
}

/// Overrides of the mode defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideDefault {
    /// Attach a console sink even in `PRODUCTION`.
    pub always_write_to_console: bool,
    /// Replaces newlines in console output. An empty string is honored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_log_section_separator: Option<String>,
}

impl OverrideDefault {
    pub fn section_separator(&self) -> &str {
        self.console_log_section_separator
            .as_deref()
            .unwrap_or(DEFAULT_SECTION_SEPARATOR)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    #[serde(rename = "loggingMode")]
    pub mode: LoggingMode,
    pub override_default: OverrideDefault,
}

impl LoggerConfig {
    pub fn new(mode: LoggingMode) -> Self {
        Self {
            mode,
            override_default: OverrideDefault::default(),
        }
    }

    #[must_use]
    pub fn always_write_to_console(mut self) -> Self {
        self.override_default.always_write_to_console = true;
        self
    }

    #[must_use]
    pub fn section_separator(mut self, separator: impl Into<String>) -> Self {
        self.override_default.console_log_section_separator = Some(separator.into());
        self
    }

    /// Whether the logger built from this config gets a console sink.
    pub fn writes_to_console(&self) -> bool {
        self.mode.writes_to_console_by_default() || self.override_default.always_write_to_console
    }
}
