//! MessageRepository - Repository per i messaggi di chat
//!
//! Oltre alle CRUD, questo repository è l'aggregatore dello stato di lettura:
//! "ho non letti dal partner X" e "ho non letti da qualcuno" sono calcolati
//! qui, su richiesta, così REST e WebSocket rispondono sugli stessi dati.

use super::Read;
use crate::dtos::ChatSessionDTO;
use crate::entities::{ChatMessage, FileUpload, MessageType};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};

const MESSAGE_COLUMNS: &str =
    "message_id, sender_id, receiver_id, content, message_type, is_read, created_at";

/// Riga della history: messaggio + eventuale file allegato (LEFT JOIN)
#[derive(Debug, sqlx::FromRow)]
pub struct MessageWithFileRow {
    pub message_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub file_id: Option<i64>,
    pub file_path: Option<String>,
    pub file_uploaded_at: Option<DateTime<Utc>>,
}

impl MessageWithFileRow {
    pub fn split(self) -> (ChatMessage, Option<FileUpload>) {
        let file = match (self.file_id, self.file_path, self.file_uploaded_at) {
            (Some(file_id), Some(file_path), Some(uploaded_at)) => Some(FileUpload {
                file_id,
                message_id: self.message_id,
                file_path,
                uploaded_at,
            }),
            _ => None,
        };

        let message = ChatMessage {
            message_id: self.message_id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            message_type: self.message_type,
            is_read: self.is_read,
            created_at: self.created_at,
        };

        (message, file)
    }
}

pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Inserisce un messaggio; l'ordine di consegna è l'ordine di commit,
    /// quindi la chiave primaria autoincrementale è anche l'ordine della chat.
    pub async fn create_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
        message_type: MessageType,
    ) -> Result<ChatMessage, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO chat_messages (sender_id, receiver_id, content, message_type, is_read, created_at) \
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(message_type)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(ChatMessage {
            message_id: result.last_insert_rowid(),
            sender_id,
            receiver_id,
            content: content.to_string(),
            message_type,
            is_read: false,
            created_at: now,
        })
    }

    /// Registra un file allegato a un messaggio già salvato
    pub async fn attach_file(&self, message_id: i64, file_path: &str) -> Result<FileUpload, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO file_uploads (message_id, file_path, uploaded_at) VALUES (?, ?, ?)",
        )
        .bind(message_id)
        .bind(file_path)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(FileUpload {
            file_id: result.last_insert_rowid(),
            message_id,
            file_path: file_path.to_string(),
            uploaded_at: now,
        })
    }

    /// History completa con un partner, dal più vecchio al più recente
    pub async fn history_between(
        &self,
        user_id: i64,
        partner_id: i64,
    ) -> Result<Vec<MessageWithFileRow>, Error> {
        let rows = sqlx::query_as::<_, MessageWithFileRow>(
            "SELECT m.message_id, m.sender_id, m.receiver_id, m.content, m.message_type, \
             m.is_read, m.created_at, \
             f.file_id AS file_id, f.file_path AS file_path, f.uploaded_at AS file_uploaded_at \
             FROM chat_messages m \
             LEFT JOIN file_uploads f ON f.message_id = m.message_id \
             WHERE (m.sender_id = ?1 AND m.receiver_id = ?2) \
                OR (m.sender_id = ?2 AND m.receiver_id = ?1) \
             ORDER BY m.message_id ASC",
        )
        .bind(user_id)
        .bind(partner_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows)
    }

    /// Una riga per interlocutore: ultimo messaggio e flag non letti,
    /// ordinate dalla conversazione più recente.
    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<ChatSessionDTO>, Error> {
        let sessions = sqlx::query_as::<_, ChatSessionDTO>(
            "SELECT p.user_id AS id, \
             CASE WHEN TRIM(p.first_name || ' ' || p.last_name) = '' THEN p.username \
                  ELSE TRIM(p.first_name || ' ' || p.last_name) END AS name, \
             (SELECT m.content FROM chat_messages m \
               WHERE (m.sender_id = p.user_id AND m.receiver_id = ?1) \
                  OR (m.sender_id = ?1 AND m.receiver_id = p.user_id) \
               ORDER BY m.message_id DESC LIMIT 1) AS last_message, \
             EXISTS (SELECT 1 FROM chat_messages m \
               WHERE m.sender_id = p.user_id AND m.receiver_id = ?1 AND m.is_read = 0) AS is_unread \
             FROM users p \
             WHERE p.user_id IN ( \
                 SELECT sender_id FROM chat_messages WHERE receiver_id = ?1 \
                 UNION \
                 SELECT receiver_id FROM chat_messages WHERE sender_id = ?1) \
             ORDER BY (SELECT MAX(m.message_id) FROM chat_messages m \
               WHERE (m.sender_id = p.user_id AND m.receiver_id = ?1) \
                  OR (m.sender_id = ?1 AND m.receiver_id = p.user_id)) DESC",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(sessions)
    }

    /// Marca come letti tutti i messaggi ricevuti da un partner.
    /// La transizione è solo 0 -> 1: il WHERE esclude i già letti.
    pub async fn mark_read_from(&self, partner_id: i64, receiver_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE chat_messages SET is_read = 1 \
             WHERE sender_id = ? AND receiver_id = ? AND is_read = 0",
        )
        .bind(partner_id)
        .bind(receiver_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn has_unread_from(&self, partner_id: i64, receiver_id: i64) -> Result<bool, Error> {
        let has_unread: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM chat_messages \
             WHERE sender_id = ? AND receiver_id = ? AND is_read = 0)",
        )
        .bind(partner_id)
        .bind(receiver_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(has_unread)
    }

    /// Segnale aggregato: almeno un messaggio non letto da qualunque partner
    pub async fn has_any_unread(&self, receiver_id: i64) -> Result<bool, Error> {
        let any_unread: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM chat_messages WHERE receiver_id = ? AND is_read = 0)",
        )
        .bind(receiver_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(any_unread)
    }

    pub async fn find_file(&self, message_id: i64) -> Result<Option<FileUpload>, Error> {
        let file = sqlx::query_as::<_, FileUpload>(
            "SELECT file_id, message_id, file_path, uploaded_at \
             FROM file_uploads WHERE message_id = ?",
        )
        .bind(message_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(file)
    }
}

impl Read<ChatMessage, i64> for MessageRepository {
    async fn read(&self, id: &i64) -> Result<Option<ChatMessage>, Error> {
        let query = format!("SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE message_id = ?");
        let message = sqlx::query_as::<_, ChatMessage>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(message)
    }
}
