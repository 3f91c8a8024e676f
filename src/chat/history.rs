//! In-memory chat history for the single active session.
//!
//! Lives only as long as the process. History is for display; it is never
//! sent back to the model.

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::council::{AgentResponse, ResponseMapping, ResponseSource};
use crate::persona::PersonaId;

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Agent {
        persona: PersonaId,
        source: ResponseSource,
    },
}

/// One chat bubble.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    #[serde(flatten)]
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
    /// `HH:MM` label shown under the bubble.
    pub time: String,
}

impl ChatMessage {
    fn new(role: MessageRole, content: String) -> Self {
        let timestamp = Local::now();
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            time: timestamp.format("%H:%M").to_string(),
            timestamp,
        }
    }

    /// Stamped at construction, so build it before the round starts.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into())
    }

    pub fn agent(response: AgentResponse) -> Self {
        Self::new(
            MessageRole::Agent {
                persona: response.persona,
                source: response.source,
            },
            response.text,
        )
    }
}

/// Append-only list of messages, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user message followed by its replies in registry order.
    pub fn record_round(&mut self, user: ChatMessage, responses: ResponseMapping) {
        self.messages.push(user);
        self.messages
            .extend(responses.into_iter().map(ChatMessage::agent));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
