//! Provider implementations of [`TextGenerator`](crate::llms::base_llm::TextGenerator).
//!
//! | Provider | Module |
//! |----------|--------|
//! | Google Gemini | [`gemini`] |

pub mod gemini;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_MODEL};
