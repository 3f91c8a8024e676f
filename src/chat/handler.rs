//! Chat endpoints: `POST /chat`, `GET /history`, `DELETE /history`.
//!
//! One round at a time: the history lock is held for the whole fan-out,
//! so concurrent submissions queue behind each other.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::history::ChatMessage;
use crate::council::ResponseSource;
use crate::persona::PersonaId;
use crate::server::AppState;

/// Incoming chat request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,
}

/// One persona's reply, with display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaReply {
    pub persona: PersonaId,
    pub display_name: String,
    pub emoji: String,
    pub text: String,
    pub source: ResponseSource,
}

/// Replies to one message, in persona order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub responses: Vec<PersonaReply>,
}

/// POST /chat: broadcast a message to every persona.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<Value>)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "message must not be empty"})),
        ));
    }

    let mut history = state.history.lock().await;
    let user = ChatMessage::user(request.message.as_str());
    let mapping = state.council.get_responses(&request.message).await;

    let registry = state.council.registry();
    let responses = mapping
        .iter()
        .map(|r| {
            let (display_name, emoji) = registry
                .get(&r.persona)
                .map(|p| (p.display_name.clone(), p.emoji.clone()))
                .unwrap_or_else(|| (r.persona.to_string(), "🤖".to_string()));
            PersonaReply {
                persona: r.persona.clone(),
                display_name,
                emoji,
                text: r.text.clone(),
                source: r.source,
            }
        })
        .collect();

    history.record_round(user, mapping);
    Ok(Json(ChatResponse { responses }))
}

/// GET /history: every message of the session, oldest first.
pub async fn history_handler(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    let history = state.history.lock().await;
    Json(history.messages().to_vec())
}

/// DELETE /history: forget the session.
pub async fn clear_history_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut history = state.history.lock().await;
    let removed = history.len();
    history.clear();
    log::info!("Cleared {} chat messages", removed);
    StatusCode::NO_CONTENT
}
