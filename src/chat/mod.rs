//! Chat session: in-memory history plus the HTTP handlers that drive
//! fan-out rounds from submitted messages.
//!
//! ```text
//! POST /chat {message}
//!   → AgentCouncil::get_responses (one round, registry order)
//!   → ChatHistory::record_round (user bubble + one bubble per persona)
//!   → {responses: [...]}
//! ```

pub mod handler;
pub mod history;

pub use handler::{ChatRequest, ChatResponse, PersonaReply};
pub use history::{ChatHistory, ChatMessage, MessageRole};
