//! Structured field extraction from message bodies

use once_cell::sync::Lazy;
use rca_model::{EventFields, LogEvent};
use regex::Regex;

static MOD_SET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"with \{([^}]*)\} mods?").expect("mod set regex"));

static MOD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Mod ID: '([^']+)'").expect("mod id regex"));

static VERSION_SET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"versions? \{([^}]*)\}").expect("version set regex"));

static VERSION_QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)version[:=]?\s*'([^']+)'").expect("quoted version regex")
});

static MOD_AT_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-z][a-z0-9_\-]*)@(\d[\w.+\-]*)").expect("mod@version regex")
});

static VERSION_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bversion (\d[\w.+\-]*)").expect("bare version regex"));

static JAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.+\-]+\.jar\b").expect("jar regex"));

/// Extract mod ids, version and jar file from a message
pub(crate) fn extract(message: &str) -> (Vec<String>, Option<String>, Option<String>) {
    let mut mod_ids: Vec<String> = Vec::new();
    for caps in MOD_SET.captures_iter(message) {
        mod_ids.extend(split_list(&caps[1]));
    }
    for caps in MOD_ID.captures_iter(message) {
        mod_ids.push(caps[1].trim().to_string());
    }
    let mut pinned = None;
    for caps in MOD_AT_VERSION.captures_iter(message) {
        mod_ids.push(caps[1].to_string());
        pinned.get_or_insert_with(|| caps[2].to_string());
    }
    mod_ids.dedup();

    let version = VERSION_SET
        .captures(message)
        .and_then(|caps| split_list(&caps[1]).next())
        .or_else(|| {
            VERSION_QUOTED
                .captures(message)
                .map(|caps| caps[1].trim().to_string())
        })
        .or(pinned)
        .or_else(|| {
            VERSION_BARE
                .captures(message)
                .map(|caps| caps[1].to_string())
        });

    let mod_file = JAR.find(message).map(|m| m.as_str().to_string());

    (mod_ids, version, mod_file)
}

/// Populate thread/logger/stage plus message-derived fields
pub(crate) fn build_fields(
    thread: Option<&str>,
    logger: Option<&str>,
    stage: Option<&str>,
    message: &str,
) -> EventFields {
    let (mod_ids, version, mod_file) = extract(message);
    EventFields {
        thread: thread.map(str::to_string),
        logger: logger.map(str::to_string),
        stage: stage.map(str::to_string),
        mod_ids,
        version,
        mod_file,
    }
}

fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Jar files named in a message, in order of appearance
#[must_use]
pub fn jar_files(message: &str) -> Vec<&str> {
    JAR.find_iter(message).map(|m| m.as_str()).collect()
}

/// True when the event declares mods from exactly one jar file
///
/// Lines such as `Found valid mod file a.jar with {x} mods` qualify; the
/// `Found duplicate mods` summary naming several jars does not.
#[must_use]
pub fn is_mod_declaration(event: &LogEvent) -> bool {
    !event.fields().mod_ids.is_empty() && jar_files(event.message()).len() == 1
}

/// `(mod_id, jar)` pairs declared by an event
#[must_use]
pub fn declarations(event: &LogEvent) -> Vec<(String, String)> {
    if !is_mod_declaration(event) {
        return Vec::new();
    }
    let Some(file) = event.fields().mod_file.clone() else {
        return Vec::new();
    };
    event
        .fields()
        .mod_ids
        .iter()
        .map(|id| (id.clone(), file.clone()))
        .collect()
}
