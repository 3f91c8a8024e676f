//! Axum routes and shared state.

use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::chat::handler::{chat_handler, clear_history_handler, history_handler};
use crate::chat::history::ChatHistory;
use crate::council::AgentCouncil;
use crate::persona::PersonaSpec;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Fan-out orchestrator, immutable for the process lifetime.
    pub council: Arc<AgentCouncil>,
    /// The single session's history. Held for the duration of a round.
    pub history: Arc<Mutex<ChatHistory>>,
}

impl AppState {
    pub fn new(council: AgentCouncil) -> Self {
        Self {
            council: Arc::new(council),
            history: Arc::new(Mutex::new(ChatHistory::new())),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/personas", get(personas_handler))
        .route("/chat", post(chat_handler))
        .route("/history", get(history_handler).delete(clear_history_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health: liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "talksense",
        "mode": if state.council.is_offline() { "offline" } else { "online" },
    }))
}

/// GET /personas: registry in order, without templates.
async fn personas_handler(State(state): State<AppState>) -> Json<Vec<PersonaSpec>> {
    Json(state.council.registry().personas().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::fallback::OFFLINE_RESPONSE;
    use crate::persona::PersonaRegistry;

    fn offline_state() -> AppState {
        AppState::new(AgentCouncil::new(PersonaRegistry::embedded().unwrap(), None))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_chat(message: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("Content-Type", "application/json")
            .body(Body::from(
                serde_json::json!({ "message": message }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_router(offline_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "talksense");
        assert_eq!(json["mode"], "offline");
    }

    #[tokio::test]
    async fn test_personas_endpoint_hides_templates() {
        let app = app_router(offline_state());

        let request = Request::builder()
            .uri("/personas")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(request).await.unwrap()).await;

        let personas = json.as_array().unwrap();
        assert_eq!(personas.len(), 3);
        assert_eq!(personas[0]["id"], "爽爽");
        assert_eq!(personas[0]["emoji"], "✨");
        assert_eq!(personas[2]["id"], "张凉");
        assert!(personas[0].get("template").is_none());
    }

    #[tokio::test]
    async fn test_chat_offline_round_and_history() {
        let state = offline_state();
        let app = app_router(state.clone());

        let response = app.clone().oneshot(post_chat("test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let replies = json["responses"].as_array().unwrap();
        let ids: Vec<&str> = replies
            .iter()
            .map(|r| r["persona"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["爽爽", "温荣", "张凉"]);
        for reply in replies {
            assert_eq!(reply["text"], OFFLINE_RESPONSE);
            assert_eq!(reply["source"], "offline");
        }
        assert_eq!(replies[1]["display_name"], "温荣");

        assert_eq!(state.history.lock().await.len(), 4);

        let request = Request::builder()
            .uri("/history")
            .body(Body::empty())
            .unwrap();
        let history = body_json(app.clone().oneshot(request).await.unwrap()).await;
        let messages = history.as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["type"], "user");
        assert_eq!(messages[0]["content"], "test");
        assert_eq!(messages[3]["persona"], "张凉");
        assert_eq!(messages[0]["time"].as_str().map(str::len), Some(5));

        let request = Request::builder()
            .method("DELETE")
            .uri("/history")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.history.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let state = offline_state();
        let app = app_router(state.clone());

        let response = app.oneshot(post_chat("   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("empty"));
        assert!(state.history.lock().await.is_empty());
    }
}
