//! # TalkSense
//!
//! A multi-persona chat assistant. Every user message is broadcast to a
//! small, fixed council of advisory personas; each answers independently
//! from its own prompt template through a text-generation service, and the
//! replies come back in persona order.
//!
//! ```text
//! user input
//!   → AgentCouncil::get_responses
//!       for each persona (registry order, paced):
//!         PersonaRegistry::render → RetryPolicy::execute(TextGenerator)
//!           → generated text | quota notice | offline response
//!   → ResponseMapping
//! ```
//!
//! Without an API key the council runs in offline/demo mode and never
//! touches the network.

pub mod chat;
pub mod config;
pub mod council;
pub mod fallback;
pub mod llms;
pub mod persona;
pub mod retry;
pub mod server;
pub mod utilities;

pub use config::AppConfig;
pub use council::{AgentCouncil, AgentResponse, ResponseMapping, ResponseSource};
pub use llms::{RawResponse, TextGenerator};
pub use persona::{PersonaId, PersonaRegistry, PersonaSpec, PromptTemplate, RenderedPrompt};
pub use retry::{CallState, ErrorClass, RetryPolicy, RetrySettings};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
