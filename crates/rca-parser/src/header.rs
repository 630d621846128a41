//! Line header recognition
//!
//! Supported shapes:
//! - `[18Oct2026 10:00:00.123] [main/INFO] [logger/STAGE]: msg` (loader debug log)
//! - `[10:00:00] [main/INFO]: msg` (`latest.log`)
//! - `2025-12-31 10:00:00 ERROR msg` and the `T`, `MM/DD/YYYY`, `YYYY/MM/DD` variants
//! - `ERROR: msg` (bare level)

use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use rca_model::{LogLevel, LogTimestamp};
use regex::Regex;

static BRACKETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(?P<ts>[^\]]+)\]\s+\[(?P<thread>[^\]]+?)/(?P<level>[A-Za-z]+)\](?:\s+\[(?P<logger>[^\]/]+)(?:/(?P<stage>[^\]]*))?\])?:?\s?(?P<msg>.*)$",
    )
    .expect("bracketed header regex")
});

static PLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<ts>\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?|\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}|\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2})(?:\s+\[(?P<thread>[^\]]+)\])?(?:\s+(?P<level>TRACE|DEBUG|INFO|WARNING|WARN|ERROR|FATAL|CRITICAL|SEVERE)\b)?:?\s*(?P<msg>.*)$",
    )
    .expect("plain header regex")
});

static BARE_LEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<level>TRACE|DEBUG|INFO|WARNING|WARN|ERROR|FATAL|CRITICAL|SEVERE):\s*(?P<msg>.*)$")
        .expect("bare level regex")
});

static CONTINUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\s+\S|Caused by:|Exception in thread|\.\.\. \d+ more|Suppressed:|(?:[a-zA-Z_$][\w$]*\.)+[A-Z][\w$]*(?:Exception|Error|Throwable)\b)",
    )
    .expect("continuation regex")
});

const DATETIME_FORMATS: &[&str] = &[
    "%d%b%Y %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Header pieces recognized on a line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Header<'a> {
    pub(crate) timestamp: Option<&'a str>,
    pub(crate) thread: Option<&'a str>,
    pub(crate) level: Option<LogLevel>,
    pub(crate) logger: Option<&'a str>,
    pub(crate) stage: Option<&'a str>,
    pub(crate) message: &'a str,
}

/// Recognize a header; `None` when the line has none
pub(crate) fn split_header(line: &str) -> Option<Header<'_>> {
    if let Some(caps) = BRACKETED.captures(line) {
        return Some(Header {
            timestamp: caps.name("ts").map(|m| m.as_str()),
            thread: caps.name("thread").map(|m| m.as_str()),
            level: caps.name("level").and_then(|m| m.as_str().parse().ok()),
            logger: caps.name("logger").map(|m| m.as_str()),
            stage: caps
                .name("stage")
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty()),
            message: caps.name("msg").map_or("", |m| m.as_str()),
        });
    }

    if let Some(caps) = PLAIN.captures(line) {
        return Some(Header {
            timestamp: caps.name("ts").map(|m| m.as_str()),
            thread: caps.name("thread").map(|m| m.as_str()),
            level: caps.name("level").and_then(|m| m.as_str().parse().ok()),
            message: caps.name("msg").map_or("", |m| m.as_str()),
            ..Header::default()
        });
    }

    BARE_LEVEL.captures(line).map(|caps| Header {
        level: caps.name("level").and_then(|m| m.as_str().parse().ok()),
        message: caps.name("msg").map_or("", |m| m.as_str()),
        ..Header::default()
    })
}

/// Stack frames, `Caused by:` and indented detail lines
pub(crate) fn is_continuation(line: &str) -> bool {
    CONTINUATION.is_match(line)
}

/// Parse a header timestamp in any supported format
pub(crate) fn parse_timestamp(value: &str) -> Option<LogTimestamp> {
    let normalized = value.trim().replace(',', ".");

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(LogTimestamp::DateTime)
        .or_else(|| {
            NaiveTime::parse_from_str(&normalized, "%H:%M:%S%.f")
                .ok()
                .map(LogTimestamp::Time)
        })
}
