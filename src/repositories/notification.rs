//! NotificationRepository - Repository per le notifiche utente

use crate::entities::Notification;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

pub struct NotificationRepository {
    connection_pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_notification(
        &self,
        recipient_id: i64,
        message: &str,
    ) -> Result<Notification, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO notifications (recipient_id, message, is_read, created_at) \
             VALUES (?, ?, 0, ?)",
        )
        .bind(recipient_id)
        .bind(message)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Notification {
            notification_id: result.last_insert_rowid(),
            recipient_id,
            message: message.to_string(),
            is_read: false,
            created_at: now,
        })
    }

    pub async fn list_by_recipient(&self, recipient_id: i64) -> Result<Vec<Notification>, Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT notification_id, recipient_id, message, is_read, created_at \
             FROM notifications WHERE recipient_id = ? \
             ORDER BY notification_id DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(notifications)
    }

    /// Marca una notifica come letta, solo se appartiene al destinatario.
    /// Ritorna il numero di righe toccate (0 = non trovata o non sua).
    pub async fn mark_read(&self, notification_id: i64, recipient_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 \
             WHERE notification_id = ? AND recipient_id = ?",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn mark_all_read(&self, recipient_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE recipient_id = ? AND is_read = 0",
        )
        .bind(recipient_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected())
    }
}
