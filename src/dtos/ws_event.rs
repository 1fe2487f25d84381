//! WebSocket Event DTOs - Data Transfer Objects per eventi WebSocket

use crate::dtos::MessageDTO;
use serde::{Deserialize, Serialize};

/// Eventi inviati dal server ai client connessi.
/// Tagged union: serde serializza come { "type": "chat_message", ... }
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEventDTO {
    /// Nuovo messaggio consegnato al destinatario
    ChatMessage { message: MessageDTO },
    /// Invito a ricaricare la lista sessioni via HTTP
    ChatSessionsUpdated,
    /// Stato di lettura dopo un mark_read (da REST o WebSocket)
    ReadStatusUpdate {
        chat_id: i64,
        has_unread: bool,
        all_read: bool,
        any_unread_sessions: bool,
    },
    /// Nuova notifica per l'utente
    Notification {
        message: String,
        notification_id: i64,
    },
    /// Conferma di connessione sul canale notifiche
    ConnectionStatus { status: String, user_id: i64 },
    Error { message: String },
}

/// Eventi accettati dal server sul WebSocket di chat.
/// Tutto il resto (invio messaggi incluso) passa dall'API HTTP.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEventDTO {
    MarkRead { chat_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_names() {
        let json = serde_json::to_string(&WsEventDTO::ChatSessionsUpdated).unwrap();
        assert_eq!(json, r#"{"type":"chat_sessions_updated"}"#);

        let json = serde_json::to_string(&WsEventDTO::ReadStatusUpdate {
            chat_id: 7,
            has_unread: false,
            all_read: true,
            any_unread_sessions: false,
        })
        .unwrap();
        assert!(json.starts_with(r#"{"type":"read_status_update""#));
    }

    #[test]
    fn test_client_event_parsing() {
        let event: ClientEventDTO =
            serde_json::from_str(r#"{"type": "mark_read", "chat_id": 3}"#).unwrap();
        let ClientEventDTO::MarkRead { chat_id } = event;
        assert_eq!(chat_id, 3);
    }

    #[test]
    fn test_unknown_client_event_rejected() {
        let result = serde_json::from_str::<ClientEventDTO>(r#"{"type": "chat_message"}"#);
        assert!(result.is_err());
    }
}
