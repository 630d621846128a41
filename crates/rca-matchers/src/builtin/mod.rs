//! Built-in matchers for Forge/NeoForge/Fabric startup logs

mod abort;
mod dependency;
mod discovery;
mod duplicate;
mod exception;
mod metadata;
mod unreviewed;

pub use abort::LoadingAbortMatcher;
pub use dependency::MissingDependencyMatcher;
pub use discovery::ModDiscoveryMatcher;
pub use duplicate::DuplicateModMatcher;
pub use exception::ExceptionMatcher;
pub use metadata::MissingMetadataMatcher;
pub use unreviewed::UnreviewedDependencyMatcher;

use rca_model::LogEvent;

/// Phrases marking the final failure of a startup
pub(crate) const ABORT_MARKERS: &[&str] = &[
    "aborting mod loading",
    "loading errors encountered",
    "mod loading has failed",
    "crash report saved",
    "game crashed",
    "exception in thread \"main\"",
    "failed to start the minecraft server",
    "encountered an unexpected exception",
];

/// Phrases marking a successful end of mod loading
pub(crate) const COMPLETE_MARKERS: &[&str] = &[
    "loading complete",
    "finished loading",
    "load complete",
    "done (",
];

/// Case-insensitive substring test against a phrase list
pub(crate) fn contains_any(message: &str, phrases: &[&str]) -> bool {
    let lower = message.to_lowercase();
    phrases.iter().any(|p| lower.contains(p))
}

/// Events whose message contains one of `phrases`
pub(crate) fn events_with<'a>(
    events: &'a [LogEvent],
    phrases: &'a [&'a str],
) -> impl Iterator<Item = &'a LogEvent> + 'a {
    events.iter().filter(move |e| contains_any(e.message(), phrases))
}
