//! Message DTOs - Data Transfer Objects per la chat 1:1

use crate::entities::{ChatMessage, FileUpload, MessageType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File allegato a un messaggio, già pronto per il client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatFileDTO {
    pub id: i64,
    pub title: String,
    pub url: String,
}

impl From<FileUpload> for ChatFileDTO {
    fn from(value: FileUpload) -> Self {
        let title = value
            .file_path
            .rsplit('/')
            .next()
            .unwrap_or(value.file_path.as_str())
            .to_string();
        Self {
            id: value.file_id,
            url: format!("/uploads/{}", value.file_path),
            title,
        }
    }
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    /// Valorizzato solo nella history: true se il messaggio è del chiamante
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sender: Option<bool>,
    pub file: Option<ChatFileDTO>,
}

impl MessageDTO {
    pub fn from_message(message: ChatMessage, file: Option<FileUpload>) -> Self {
        Self {
            id: message.message_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            message_type: message.message_type,
            timestamp: message.created_at,
            is_read: message.is_read,
            is_sender: None,
            file: file.map(ChatFileDTO::from),
        }
    }
}

/// Body JSON di POST /chat (la variante multipart viaggia come form)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendMessageDTO {
    pub receiver: i64,
    #[serde(default)]
    pub content: Option<String>,
}

/// Sessione di chat vista dal chiamante: una riga per interlocutore
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ChatSessionDTO {
    pub id: i64,
    pub name: String,
    pub last_message: String,
    pub is_unread: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MarkReadDTO {
    pub chat_id: i64,
}

/// Esito di mark_read: stato di lettura per il partner e aggregato globale
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReadStatusDTO {
    pub chat_id: i64,
    pub has_unread: bool,
    pub all_read: bool,
    pub any_unread_sessions: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UnreadDTO {
    pub any_unread: bool,
}
