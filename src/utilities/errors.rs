//! Error types for TalkSense.
//!
//! Only [`ConfigurationError`] is ever fatal. Everything raised while talking
//! to the text-generation service is recovered inside the council and turned
//! into response text.

use thiserror::Error;

/// Errors raised while loading the persona registry or process configuration.
///
/// Fatal at startup; never produced per call.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A persona was declared without a prompt template.
    #[error("Persona '{persona}' has no prompt template")]
    MissingTemplate { persona: String },

    /// A template did not contain exactly one `{user_input}` slot.
    #[error("Prompt template for persona '{persona}' must contain exactly one {{user_input}} slot, found {found}")]
    InvalidTemplate { persona: String, found: usize },

    /// The same persona id appeared twice.
    #[error("Persona '{persona}' is declared more than once")]
    DuplicatePersona { persona: String },

    /// The registry would contain no personas at all.
    #[error("Persona registry is empty")]
    EmptyRegistry,

    /// The persona file could not be read.
    #[error("Failed to read persona file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The persona file could not be decoded.
    #[error("Failed to decode persona definitions: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// A numeric environment setting was malformed.
    #[error("Invalid value '{value}' for {name}")]
    InvalidSetting { name: String, value: String },
}

/// Errors raised while rendering a persona prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// The requested persona is not part of the registry.
    #[error("No prompt template found for persona '{persona}'")]
    TemplateNotFound { persona: String },
}

/// Errors raised by a single call to the text-generation service.
///
/// The `Display` output is what [`crate::retry::classify`] inspects, so each
/// variant keeps the numeric status code and the service's status string
/// (`RESOURCE_EXHAUSTED`, `UNAVAILABLE`, ...) in its message.
#[derive(Debug, Error)]
pub enum LLMCallError {
    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status with an undecodable body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Structured error object returned by the service.
    #[error("{code} {status}: {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// The success body was not valid JSON for the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LLMCallError {
    /// The request URL carries the API key, so it is stripped from the text.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        match err.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}
