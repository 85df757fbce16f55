//! Telemetry preferences carried inside the instance configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Logging preferences resolved from configuration and CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogPreferences {
    /// Filter expression consumed by the subscriber.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogPreferences {
    fn default() -> Self {
        Self {
            filter: defaults::default_log_filter(),
            format: defaults::default_log_format(),
        }
    }
}

impl LogPreferences {
    /// Applies optional overrides, CLI winning over configuration.
    #[must_use]
    pub fn with_overrides(mut self, filter: Option<String>, format: Option<LogFormat>) -> Self {
        if let Some(filter) = filter {
            self.filter = filter;
        }
        if let Some(format) = format {
            self.format = format;
        }
        self
    }
}
