//! Notification services - Notifiche utente su doppio trasporto
//!
//! La creazione è interna (iscrizioni, nuovi materiali): la riga finisce
//! a database e l'evento viene spinto alle connessioni vive. Il push può
//! fallire senza conseguenze: il client recupera dal fallback HTTP.

use crate::core::{AppError, AppState};
use crate::dtos::NotificationDTO;
use crate::entities::{Notification, User};
use crate::ws::fanout;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Crea una notifica e la spinge al destinatario se connesso.
/// Usata dagli altri service, non esposta come endpoint.
#[instrument(skip(state, message), fields(recipient_id = %recipient_id))]
pub async fn create_notification(
    state: &AppState,
    recipient_id: i64,
    message: String,
) -> Result<Notification, AppError> {
    let notification = state
        .notification
        .create_notification(recipient_id, &message)
        .await?;

    fanout::push_notification(state, &notification);

    debug!(notification_id = notification.notification_id, "Notification created");
    Ok(notification)
}

/// Notifiche del chiamante, dalla più recente
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<NotificationDTO>>, AppError> {
    let notifications = state
        .notification
        .list_by_recipient(current_user.user_id)
        .await?;
    debug!("Listed {} notifications", notifications.len());

    Ok(Json(
        notifications.into_iter().map(NotificationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<serde_json::Value>, AppError> {
    let marked = state
        .notification
        .mark_all_read(current_user.user_id)
        .await?;

    info!(marked, "All notifications marked as read");
    Ok(Json(serde_json::json!({ "status": "success" })))
}

/// Marca una singola notifica come letta; 404 se non è del chiamante
#[instrument(skip(state, current_user), fields(notification_id = %notification_id, user_id = %current_user.user_id))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(notification_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let affected = state
        .notification
        .mark_read(notification_id, current_user.user_id)
        .await?;

    if affected == 0 {
        return Err(AppError::not_found("Notification not found"));
    }

    info!("Notification marked as read");
    Ok(Json(serde_json::json!({ "status": "success" })))
}
