//! Whole-log extraction of libraries and exceptions

use crate::fields::declarations;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rca_model::{ExceptionInfo, LibraryReference, LogEvent, LogLevel, Severity};
use regex::Regex;
use std::collections::BTreeSet;

static EXCEPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[\s:(])(?P<ty>(?:[a-z_$][\w$]*\.)+[A-Z][\w$]*(?:Exception|Error))(?::\s*(?P<msg>.+))?",
    )
    .expect("exception regex")
});

/// Exception type and message named in a message body
#[must_use]
pub fn find_exception(message: &str) -> Option<(&str, Option<&str>)> {
    EXCEPTION.captures(message).and_then(|caps| {
        let ty = caps.name("ty")?.as_str();
        let msg = caps.name("msg").map(|m| m.as_str().trim());
        Some((ty, msg))
    })
}

/// Mods and libraries referenced in the log, sorted by id
#[must_use]
pub fn collect_libraries(events: &[LogEvent]) -> Vec<LibraryReference> {
    let mut refs = BTreeSet::new();
    let mut declared = BTreeSet::new();

    for event in events {
        for (mod_id, file) in declarations(event) {
            declared.insert(mod_id.clone());
            refs.insert(LibraryReference {
                mod_id,
                version: event.fields().version.clone(),
                file: Some(file),
            });
        }
    }

    for event in events {
        for mod_id in &event.fields().mod_ids {
            if declared.insert(mod_id.clone()) {
                refs.insert(LibraryReference {
                    mod_id: mod_id.clone(),
                    version: event.fields().version.clone(),
                    file: None,
                });
            }
        }
    }

    refs.into_iter().collect()
}

/// Longest stack trace kept per exception type
const MAX_TRACE_LINES: usize = 64;

/// Exception types in order of first occurrence, with counts
///
/// The continuation lines right after the first occurrence form its stack
/// trace. A type first seen on a continuation line takes its severity from
/// the entry it continues.
#[must_use]
pub fn collect_exceptions(events: &[LogEvent]) -> Vec<ExceptionInfo> {
    let mut seen: IndexMap<String, ExceptionInfo> = IndexMap::new();
    let mut entry_level = None;

    for (index, event) in events.iter().enumerate() {
        if !event.is_continuation() {
            entry_level = event.level();
        }
        let Some((ty, msg)) = find_exception(event.message()) else {
            continue;
        };
        seen.entry(ty.to_string())
            .and_modify(|info| info.occurrence_count += 1)
            .or_insert_with(|| ExceptionInfo {
                exception_type: ty.to_string(),
                message: msg.map(str::to_string),
                occurrence_count: 1,
                first_event: event.seq(),
                severity: entry_level.map(level_severity),
                stack_trace: stack_trace(&events[index + 1..]),
            });
    }

    seen.into_values().collect()
}

fn stack_trace(following: &[LogEvent]) -> Option<String> {
    let lines: Vec<&str> = following
        .iter()
        .take_while(|e| e.is_continuation())
        .take(MAX_TRACE_LINES)
        .map(|e| e.raw().trim())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn level_severity(level: LogLevel) -> Severity {
    match level {
        LogLevel::Fatal => Severity::Fatal,
        LogLevel::Error => Severity::High,
        LogLevel::Warn => Severity::Medium,
        LogLevel::Trace | LogLevel::Debug | LogLevel::Info => Severity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogParser;
    use pretty_assertions::assert_eq;

    const LOG: &str = "\
[10:00:00] [main/DEBUG] [ModFile/LOADING]: Found valid mod file rubidium-0.7.1.jar with {rubidium} mods - versions {0.7.1}
[10:00:01] [main/DEBUG] [ModFile/LOADING]: Found valid mod file embeddium-0.3.18.jar with {rubidium} mods - versions {0.3.18}
[10:00:02] [main/ERROR] [ModSorter/LOADING]: Found duplicate mods: Mod ID: 'jei' from mod files: a.jar, b.jar
[10:00:03] [main/ERROR] [Main/]: Failed: java.lang.NoSuchMethodError: getPointer
java.lang.NoSuchMethodError: getPointer
Caused by: java.lang.IllegalStateException: bad state
";

    #[test]
    fn libraries_sorted_and_deduplicated() {
        let parsed = LogParser::new().parse(LOG);
        let libs = collect_libraries(&parsed.events);

        assert_eq!(libs.len(), 3);
        assert_eq!(libs[0].mod_id, "jei");
        assert_eq!(libs[0].file, None);
        assert_eq!(libs[1].file.as_deref(), Some("embeddium-0.3.18.jar"));
        assert_eq!(libs[2].file.as_deref(), Some("rubidium-0.7.1.jar"));
        assert_eq!(libs[2].version.as_deref(), Some("0.7.1"));
    }

    #[test]
    fn exceptions_counted_in_first_seen_order() {
        let parsed = LogParser::new().parse(LOG);
        let exceptions = collect_exceptions(&parsed.events);

        assert_eq!(exceptions.len(), 2);
        assert_eq!(exceptions[0].exception_type, "java.lang.NoSuchMethodError");
        assert_eq!(exceptions[0].occurrence_count, 2);
        assert_eq!(exceptions[0].first_event, 3);
        assert_eq!(exceptions[0].message.as_deref(), Some("getPointer"));
        assert_eq!(exceptions[1].exception_type, "java.lang.IllegalStateException");
    }

    #[test]
    fn first_occurrence_keeps_stack_trace() {
        let parsed = LogParser::new().parse(
            "[12:00:05] [Render thread/ERROR]: Failed to create mod instance: java.lang.NoSuchMethodError: getPointer\n\
             \tat me.jellysquid.mods.sodium.client.SodiumClientMod.<init>(SodiumClientMod.java:42)\n\
             \tat net.minecraftforge.fml.ModContainer.construct(ModContainer.java:120)\n\
             Caused by: java.lang.IllegalStateException: bad state\n\
             \t... 12 more\n\
             [12:00:06] [Render thread/FATAL]: Game crashed!\n",
        );
        let exceptions = collect_exceptions(&parsed.events);

        assert_eq!(exceptions.len(), 2);
        let first = &exceptions[0];
        assert_eq!(first.severity, Some(Severity::High));
        assert_eq!(
            first.stack_trace.as_deref(),
            Some(
                "at me.jellysquid.mods.sodium.client.SodiumClientMod.<init>(SodiumClientMod.java:42)\n\
                 at net.minecraftforge.fml.ModContainer.construct(ModContainer.java:120)\n\
                 Caused by: java.lang.IllegalStateException: bad state\n\
                 ... 12 more"
            )
        );

        let cause = &exceptions[1];
        assert_eq!(cause.severity, Some(Severity::High));
        assert_eq!(cause.stack_trace.as_deref(), Some("... 12 more"));
    }

    #[test]
    fn exception_without_frames_has_no_trace() {
        let parsed = LogParser::new().parse(
            "[10:00:00] [main/WARN]: Recovered from java.io.IOException: closed\n\
             [10:00:01] [main/INFO]: Continuing\n",
        );
        let exceptions = collect_exceptions(&parsed.events);

        assert_eq!(exceptions[0].stack_trace, None);
        assert_eq!(exceptions[0].severity, Some(Severity::Medium));
    }
}
