//! # Startup Log Parser
//!
//! Tokenizes raw startup log text into [`LogEvent`]s.
//!
//! Parsing is local to each line: no state is carried from one line to the
//! next, so every line yields the same event regardless of its neighbours.
//! Lines that cannot be tokenized are recovered as malformed events rather
//! than failing the run.
//!
//! ## Example
//!
//! ```
//! use rca_parser::parse_log;
//!
//! let parsed = parse_log("[10:00:00] [main/INFO]: Starting\nnot a header\n\n");
//! assert_eq!(parsed.events.len(), 2);
//! assert_eq!(parsed.malformed_lines, 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod extract;
mod fields;
mod header;

pub use error::LineParseError;
pub use extract::{collect_exceptions, collect_libraries, find_exception};
pub use fields::{declarations, is_mod_declaration, jar_files};

use rca_model::{EventFields, LogEvent};
use tracing::debug;

/// Output of a whole-log parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    /// One event per non-blank line, in log order
    pub events: Vec<LogEvent>,
    /// Number of input lines, blank lines included
    pub line_count: usize,
    /// Lines recovered as malformed events
    pub malformed_lines: usize,
}

/// Line tokenizer using the built-in header patterns
#[derive(Debug, Clone, Copy)]
pub struct LogParser {
    extract_fields: bool,
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser {
    /// Create a parser with field extraction enabled
    #[must_use]
    pub fn new() -> Self {
        Self {
            extract_fields: true,
        }
    }

    /// Toggle message field extraction (mod ids, versions, jar files)
    #[must_use]
    pub fn with_field_extraction(mut self, enabled: bool) -> Self {
        self.extract_fields = enabled;
        self
    }

    /// Parse a whole log
    #[must_use]
    pub fn parse(&self, text: &str) -> ParsedLog {
        let mut parsed = ParsedLog::default();

        for line in text.lines() {
            parsed.line_count += 1;
            if line.trim().is_empty() {
                continue;
            }

            let seq = parsed.events.len();
            let event = self.parse_line(seq, line);
            if event.is_malformed() {
                parsed.malformed_lines += 1;
            }
            parsed.events.push(event);
        }

        debug!(
            lines = parsed.line_count,
            events = parsed.events.len(),
            malformed = parsed.malformed_lines,
            "Parsed log"
        );
        parsed
    }

    /// Parse one line; never fails
    ///
    /// A [`LineParseError`] is recovered as a malformed event with empty
    /// fields.
    #[must_use]
    pub fn parse_line(&self, seq: usize, line: &str) -> LogEvent {
        match self.try_parse_line(seq, line) {
            Ok(event) => event,
            Err(err) => {
                debug!(error = %err, "Recovered malformed line");
                LogEvent::malformed(seq, line)
            }
        }
    }

    /// Parse one line, reporting why it could not be tokenized
    ///
    /// # Errors
    /// Returns [`LineParseError`] when the line has control characters, an
    /// unparseable timestamp, or neither a header nor a continuation shape
    pub fn try_parse_line(&self, seq: usize, line: &str) -> Result<LogEvent, LineParseError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.chars().any(|c| c.is_control() && c != '\t') {
            return Err(LineParseError::ControlCharacters { seq });
        }

        if let Some(header) = header::split_header(line) {
            let mut event = LogEvent::new(seq, line).with_message(header.message.trim());

            if let Some(value) = header.timestamp {
                let timestamp = header::parse_timestamp(value)
                    .ok_or_else(|| LineParseError::invalid_timestamp(seq, value))?;
                event = event.with_timestamp(timestamp);
            }
            if let Some(level) = header.level {
                event = event.with_level(level);
            }

            let fields = if self.extract_fields {
                fields::build_fields(header.thread, header.logger, header.stage, header.message)
            } else {
                EventFields {
                    thread: header.thread.map(str::to_string),
                    logger: header.logger.map(str::to_string),
                    stage: header.stage.map(str::to_string),
                    ..EventFields::default()
                }
            };
            return Ok(event.with_fields(fields));
        }

        if header::is_continuation(line) {
            let event = LogEvent::new(seq, line);
            if !self.extract_fields {
                return Ok(event);
            }
            let fields = fields::build_fields(None, None, None, event.message());
            return Ok(event.with_fields(fields));
        }

        Err(LineParseError::NoHeader { seq })
    }
}

/// Parse a whole log with the default parser
#[must_use]
pub fn parse_log(text: &str) -> ParsedLog {
    LogParser::new().parse(text)
}
