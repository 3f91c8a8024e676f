//! Text-generation backends.
//!
//! - [`base_llm`] - The [`TextGenerator`] trait the retry policy calls through
//! - [`response`] - Response shapes and ordered text extraction
//! - [`providers`] - Concrete HTTP backends (Gemini)

pub mod base_llm;
pub mod providers;
pub mod response;

pub use base_llm::TextGenerator;
pub use response::{Candidate, ContentPart, RawResponse, NO_CONTENT_APOLOGY};

#[cfg(test)]
pub(crate) mod testing;
