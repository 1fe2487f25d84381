//! Notification DTOs - Data Transfer Objects per le notifiche

use crate::entities::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationDTO {
    pub id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDTO {
    fn from(value: Notification) -> Self {
        Self {
            id: value.notification_id,
            message: value.message,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}
