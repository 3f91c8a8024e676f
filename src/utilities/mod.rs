//! Shared utilities.

pub mod errors;
pub mod pacer;
pub mod sleeper;

pub use errors::{ConfigurationError, LLMCallError, PromptError};
