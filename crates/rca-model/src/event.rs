//! Parsed log events
//!
//! A [`LogEvent`] is created once by the parser and never mutated. Matchers
//! reference events by their sequence index, which doubles as the ordinal
//! clock for chain reconstruction.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Log level as written in the line header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// ERROR or FATAL
    #[inline]
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "FATAL" | "CRITICAL" | "SEVERE" => Ok(Self::Fatal),
            _ => Err(()),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

/// Line timestamp
///
/// Launcher logs often carry only a wall-clock time, so the date part is
/// optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogTimestamp {
    /// Full date and time
    DateTime(NaiveDateTime),
    /// Time of day only
    Time(NaiveTime),
}

impl LogTimestamp {
    /// Time-of-day component
    #[must_use]
    pub fn time(&self) -> NaiveTime {
        match self {
            Self::DateTime(dt) => dt.time(),
            Self::Time(t) => *t,
        }
    }
}

/// Fields extracted from a line
///
/// Every field is optional; a malformed line carries `EventFields::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    /// Thread name from `[thread/LEVEL]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    /// Logger name from `[logger/STAGE]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// Stage marker from `[logger/STAGE]` (e.g. `SCAN`, `LOADING`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Mod identifiers mentioned in the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mod_ids: Vec<String>,
    /// Version string mentioned in the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Mod file (jar) mentioned in the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_file: Option<String>,
}

impl EventFields {
    /// True when nothing was extracted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single parsed log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    seq: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<LogTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<LogLevel>,
    raw: String,
    message: String,
    #[serde(default)]
    fields: EventFields,
    #[serde(default)]
    malformed: bool,
}

impl LogEvent {
    /// Create an event with no extracted header; the message is the raw line
    #[must_use]
    pub fn new(seq: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            seq,
            timestamp: None,
            level: None,
            message: raw.trim().to_string(),
            raw,
            fields: EventFields::default(),
            malformed: false,
        }
    }

    /// Best-effort event for a line that could not be tokenized
    #[must_use]
    pub fn malformed(seq: usize, raw: impl Into<String>) -> Self {
        Self {
            malformed: true,
            ..Self::new(seq, raw)
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: LogTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: EventFields) -> Self {
        self.fields = fields;
        self
    }

    /// Position in the log (0-based, counts only non-blank lines)
    #[inline]
    #[must_use]
    pub fn seq(&self) -> usize {
        self.seq
    }

    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Option<LogTimestamp> {
        self.timestamp
    }

    #[inline]
    #[must_use]
    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    /// Original line text
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Message body with the header stripped
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &EventFields {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        self.fields.stage.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// ERROR or FATAL level
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level.is_some_and(LogLevel::is_error)
    }

    /// Headerless line continuing the previous entry (stack frame, wrapped text)
    #[inline]
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.level.is_none() && self.timestamp.is_none() && !self.malformed
    }
}
