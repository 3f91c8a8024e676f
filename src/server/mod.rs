//! HTTP surface for the chat assistant.
//!
//! # Endpoints
//!
//! - `GET    /health`: Liveness probe, reports online/offline mode
//! - `GET    /personas`: Personas in reply order
//! - `POST   /chat`: Broadcast one message to every persona
//! - `GET    /history`: Messages of the current session
//! - `DELETE /history`: Clear the session

pub mod routes;

pub use routes::{app_router, AppState};
