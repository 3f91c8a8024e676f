//! Failure classification.
//!
//! Service errors are classified by case-insensitive substring matching on
//! their text. Quota markers are checked before transient ones, so a 429
//! carrying "rate limit" wording is still a quota error.

use crate::utilities::errors::{LLMCallError, PromptError};

const QUOTA_MARKERS: &[&str] = &["quota", "quotafailure", "429", "resource_exhausted"];
const TRANSIENT_MARKERS: &[&str] = &["503", "unavailable", "overloaded", "rate limit"];

/// What kind of failure a call ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Daily/free-tier quota used up. Never retried.
    Quota,
    /// Overload, unavailability or rate limiting. Retried with backoff.
    Transient,
    /// Anything else. Falls back immediately.
    Permanent,
    /// The persona cannot be prompted at all.
    Configuration,
}

/// Classify an error by its textual description.
pub fn classify(description: &str) -> ErrorClass {
    let lowered = description.to_lowercase();
    if QUOTA_MARKERS.iter().any(|m| lowered.contains(m)) {
        ErrorClass::Quota
    } else if TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m)) {
        ErrorClass::Transient
    } else {
        ErrorClass::Permanent
    }
}

impl From<&LLMCallError> for ErrorClass {
    fn from(err: &LLMCallError) -> Self {
        classify(&err.to_string())
    }
}

impl From<&PromptError> for ErrorClass {
    fn from(_: &PromptError) -> Self {
        ErrorClass::Configuration
    }
}
