//! Base trait for text-generation backends.
//!
//! The retry policy only ever sees a [`TextGenerator`]: one rendered prompt
//! in, one raw response (or error) out. A backend holds its own credentials
//! and model identifier; it never retries and never swallows errors.

use std::fmt;

use async_trait::async_trait;

use crate::llms::response::RawResponse;
use crate::persona::template::RenderedPrompt;
use crate::utilities::errors::LLMCallError;

/// A single-shot text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Provider name, for logs.
    fn provider(&self) -> &str {
        "gemini"
    }

    /// Perform exactly one generation request.
    async fn generate(&self, prompt: &RenderedPrompt) -> Result<RawResponse, LLMCallError>;
}
