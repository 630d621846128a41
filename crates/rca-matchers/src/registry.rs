//! Matcher registry
//!
//! The registry is the single extension point of the analysis: a category is
//! added by registering a matcher, never by changing the chain builder.
//! Declaration order is significant; it breaks ties between results that
//! start at the same log position.

use crate::builtin::{
    DuplicateModMatcher, ExceptionMatcher, LoadingAbortMatcher, MissingDependencyMatcher,
    MissingMetadataMatcher, ModDiscoveryMatcher, UnreviewedDependencyMatcher,
};
use crate::{Matcher, MatcherError};
use std::sync::Arc;

/// Ordered set of matchers with unique names
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    matchers: Vec<Arc<dyn Matcher>>,
}

impl std::fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.names())
            .finish()
    }
}

impl MatcherRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Create registry with built-in matchers in declaration order
    #[must_use]
    pub fn with_defaults() -> Self {
        let matchers: Vec<Arc<dyn Matcher>> = vec![
            Arc::new(ModDiscoveryMatcher),
            Arc::new(DuplicateModMatcher),
            Arc::new(MissingDependencyMatcher),
            Arc::new(MissingMetadataMatcher),
            Arc::new(ExceptionMatcher),
            Arc::new(UnreviewedDependencyMatcher),
            Arc::new(LoadingAbortMatcher),
        ];
        Self { matchers }
    }

    /// Subset of the built-in matchers, kept in declaration order
    ///
    /// An empty selection keeps every built-in matcher.
    ///
    /// # Errors
    /// Returns [`MatcherError::UnknownMatcher`] for a name that is not built in
    pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Self, MatcherError> {
        Self::with_defaults().retain_named(names)
    }

    /// Keep only the named matchers, in declaration order
    ///
    /// # Errors
    /// Returns [`MatcherError::UnknownMatcher`] for an unregistered name
    pub fn retain_named<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, MatcherError> {
        if names.is_empty() {
            return Ok(self);
        }
        if let Some(unknown) = names.iter().find(|n| !self.contains(n.as_ref())) {
            return Err(MatcherError::unknown(unknown.as_ref(), &self.names()));
        }
        self.matchers
            .retain(|m| names.iter().any(|n| n.as_ref() == m.name()));
        tracing::debug!(matchers = ?self.names(), "Selected matchers");
        Ok(self)
    }

    /// Register a matcher after the existing ones
    ///
    /// # Errors
    /// Returns [`MatcherError::DuplicateName`] if the name is taken
    pub fn register<M: Matcher>(&mut self, matcher: M) -> Result<(), MatcherError> {
        if self.contains(matcher.name()) {
            return Err(MatcherError::DuplicateName(matcher.name().to_string()));
        }
        tracing::debug!(matcher = matcher.name(), "Registered matcher");
        self.matchers.push(Arc::new(matcher));
        Ok(())
    }

    /// Check if a matcher name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.matchers.iter().any(|m| m.name() == name)
    }

    /// Find matcher by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Matcher>> {
        self.matchers.iter().find(|m| m.name() == name)
    }

    /// Registered names in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Get number of registered matchers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Iterate matchers with their declaration rank
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<dyn Matcher>)> {
        self.matchers.iter().enumerate()
    }
}
