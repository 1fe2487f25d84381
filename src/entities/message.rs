//! Message entities - Messaggi di chat 1:1 e file allegati

use super::enums::MessageType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ChatMessage {
    pub message_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub message_type: MessageType,
    // la spunta di lettura passa da 0 a 1 una sola volta, mai al contrario
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct FileUpload {
    pub file_id: i64,
    pub message_id: i64,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}
