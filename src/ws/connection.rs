//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::AppState;
use crate::dtos::{ClientEventDTO, WsEventDTO};
use crate::entities::User;
use crate::services::chat::mark_read_and_aggregate;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info, instrument, warn};

/// Avvia i task di lettura/scrittura per una connessione di chat.
/// La connessione resta registrata finché il suo socket non si chiude.
#[instrument(skip(ws, state, user), fields(user_id = %user.user_id))]
pub async fn handle_chat_socket(ws: WebSocket, state: Arc<AppState>, user: User) {
    info!("Chat WebSocket connection established");

    // Canale interno della connessione: il fanout scrive qui,
    // il task di scrittura svuota verso il socket.
    let (int_tx, int_rx) = unbounded_channel::<WsEventDTO>();
    let conn_id = state.chat_online.register(user.user_id, int_tx.clone());

    let (ws_tx, ws_rx) = ws.split();

    tokio::spawn(write_ws(user.user_id, conn_id, ws_tx, int_rx));
    tokio::spawn(listen_chat_ws(user, conn_id, ws_rx, int_tx, state));
}

/// Avvia i task per una connessione al canale notifiche.
/// In ingresso non è previsto nulla: i frame ricevuti vengono ignorati.
#[instrument(skip(ws, state, user), fields(user_id = %user.user_id))]
pub async fn handle_notification_socket(ws: WebSocket, state: Arc<AppState>, user: User) {
    info!("Notification WebSocket connection established");

    let (int_tx, int_rx) = unbounded_channel::<WsEventDTO>();
    let conn_id = state.notify_online.register(user.user_id, int_tx.clone());

    // Conferma di connessione, come da contratto col client
    let _ = int_tx.send(WsEventDTO::ConnectionStatus {
        status: "connected".to_string(),
        user_id: user.user_id,
    });

    let (ws_tx, ws_rx) = ws.split();

    tokio::spawn(write_ws(user.user_id, conn_id, ws_tx, int_rx));
    tokio::spawn(listen_notification_ws(user, conn_id, ws_rx, state));
}

/// Task di scrittura: serializza gli eventi del canale interno verso il socket.
/// Termina quando il canale si chiude (unregister) o la write fallisce.
#[instrument(skip(websocket_tx, internal_rx), fields(user_id, conn_id))]
async fn write_ws(
    user_id: i64,
    conn_id: u64,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<WsEventDTO>,
) {
    debug!("Write task started");

    while let Some(event) = internal_rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(json) => {
                if let Err(e) = websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await {
                    warn!("Failed to write to WebSocket, closing: {:?}", e);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to serialize event: {:?}", e);
            }
        }
    }

    debug!("Write task terminated");
}

/// Task di lettura del canale chat: accetta solo mark_read, tutto il resto
/// viene respinto verso l'API HTTP.
#[instrument(skip(user, websocket_rx, internal_tx, state), fields(user_id = %user.user_id, conn_id))]
async fn listen_chat_ws(
    user: User,
    conn_id: u64,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<WsEventDTO>,
    state: Arc<AppState>,
) {
    debug!("Listen task started");

    while let Some(msg_result) = websocket_rx.next().await {
        let msg = match msg_result {
            Ok(m) => m,
            Err(e) => {
                warn!("WebSocket error: {:?}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEventDTO>(&text) {
                Ok(ClientEventDTO::MarkRead { chat_id }) => {
                    debug!(chat_id, "mark_read received over WebSocket");
                    match mark_read_and_aggregate(&state, user.user_id, chat_id).await {
                        Ok(status) => {
                            let _ = internal_tx.send(WsEventDTO::ReadStatusUpdate {
                                chat_id: status.chat_id,
                                has_unread: status.has_unread,
                                all_read: status.all_read,
                                any_unread_sessions: status.any_unread_sessions,
                            });
                        }
                        Err(_) => {
                            let _ = internal_tx.send(WsEventDTO::Error {
                                message: "Failed to mark messages as read".to_string(),
                            });
                        }
                    }
                }
                Err(_) => {
                    // l'invio di messaggi via WebSocket è stato rimosso: solo HTTP
                    warn!("Unsupported WebSocket message, redirecting to HTTP API");
                    let _ = internal_tx.send(WsEventDTO::Error {
                        message: "This operation should be performed via HTTP API".to_string(),
                    });
                }
            },
            Message::Close(_) => {
                info!("Close message received");
                break;
            }
            _ => {}
        }
    }

    // Cleanup: rimuove SOLO questa connessione; le altre dell'utente restano.
    // Togliere il sender dal registro chiude il canale e termina il write task.
    info!("Cleaning up chat connection");
    drop(internal_tx);
    state.chat_online.unregister(user.user_id, conn_id);
    debug!("Listen task terminated");
}

/// Task di lettura del canale notifiche: logga e ignora i frame in ingresso
#[instrument(skip(user, websocket_rx, state), fields(user_id = %user.user_id, conn_id))]
async fn listen_notification_ws(
    user: User,
    conn_id: u64,
    mut websocket_rx: SplitStream<WebSocket>,
    state: Arc<AppState>,
) {
    while let Some(msg_result) = websocket_rx.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                debug!(frame = %text, "Ignoring inbound frame on notification channel");
            }
            Ok(Message::Close(_)) => {
                info!("Close message received");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket error: {:?}", e);
                break;
            }
        }
    }

    info!("Cleaning up notification connection");
    state.notify_online.unregister(user.user_id, conn_id);
}
