//! Personas: the fixed advisory personalities a message is broadcast to.
//!
//! Each persona owns one prompt template with a single `{user_input}` slot.
//! The registry is loaded once at startup (embedded YAML or a file) and is
//! read-only afterwards.

pub mod registry;
pub mod template;

pub use registry::{PersonaId, PersonaRegistry, PersonaSpec};
pub use template::{PromptTemplate, RenderedPrompt, USER_INPUT_SLOT};
