//! WebSocket Module - Gestione WebSocket per comunicazione real-time
//!
//! Due endpoint, autenticati con il token JWT nella query string:
//! - /ws/chat: push di nuovi messaggi e stato di lettura, mark_read in ingresso
//! - /ws/notifications: push delle notifiche, nessun ingresso
//!
//! L'invio di messaggi passa SEMPRE dall'API HTTP: il WebSocket è solo
//! il canale di consegna in tempo reale.

pub mod connection;
pub mod fanout;
pub mod usermap;

// Re-exports pubblici
pub use connection::{handle_chat_socket, handle_notification_socket};
pub use fanout::{push_new_message, push_notification};

use crate::core::auth::authenticate_ws_token;
use crate::dtos::WsAuthQuery;
use crate::AppState;
use axum::{
    extract::{Query, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

/// Entry point per l'upgrade del canale chat
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsAuthQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match authenticate_ws_token(&state, params.token.as_deref()).await {
        Ok(user) => ws.on_upgrade(move |socket| handle_chat_socket(socket, state, user)),
        Err(_) => {
            warn!("Rejected chat WebSocket upgrade (invalid token)");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// Entry point per l'upgrade del canale notifiche
pub async fn notification_ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsAuthQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match authenticate_ws_token(&state, params.token.as_deref()).await {
        Ok(user) => ws.on_upgrade(move |socket| handle_notification_socket(socket, state, user)),
        Err(_) => {
            warn!("Rejected notification WebSocket upgrade (invalid token)");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}
