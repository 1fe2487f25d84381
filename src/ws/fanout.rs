//! Fanout - Consegna eventi alle connessioni vive
//!
//! I messaggi nascono via REST; qui avviene solo la spinta verso i client
//! connessi. Un destinatario offline non è un errore: il dato è già a
//! database e verrà recuperato dal fallback HTTP.

use crate::AppState;
use crate::dtos::{MessageDTO, WsEventDTO};
use crate::entities::Notification;
use tracing::{debug, instrument};

/// Spinge un nuovo messaggio al destinatario e un hint di refresh
/// della lista sessioni a entrambe le parti.
#[instrument(skip(state, message), fields(message_id = %message.id))]
pub fn push_new_message(state: &AppState, message: &MessageDTO) {
    let delivered = state.chat_online.send_to_user(
        message.receiver_id,
        &WsEventDTO::ChatMessage {
            message: message.clone(),
        },
    );
    debug!(
        receiver_id = message.receiver_id,
        delivered, "New message pushed"
    );

    state
        .chat_online
        .send_to_user(message.receiver_id, &WsEventDTO::ChatSessionsUpdated);
    state
        .chat_online
        .send_to_user(message.sender_id, &WsEventDTO::ChatSessionsUpdated);
}

/// Spinge una notifica appena creata al suo destinatario
#[instrument(skip(state, notification), fields(notification_id = %notification.notification_id))]
pub fn push_notification(state: &AppState, notification: &Notification) {
    let delivered = state.notify_online.send_to_user(
        notification.recipient_id,
        &WsEventDTO::Notification {
            message: notification.message.clone(),
            notification_id: notification.notification_id,
        },
    );
    debug!(
        recipient_id = notification.recipient_id,
        delivered, "Notification pushed"
    );
}
