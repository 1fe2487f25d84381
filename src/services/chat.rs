//! Chat services - Messaggistica 1:1 su doppio trasporto
//!
//! La creazione dei messaggi passa da qui (HTTP): il WebSocket è solo il
//! canale di push. Chi è offline recupera tutto dal fallback HTTP, quindi
//! ogni handler risponde sugli stessi dati che il fanout ha appena spinto.

use crate::core::{AppError, AppState};
use crate::dtos::{
    ChatSessionDTO, MarkReadDTO, MessageDTO, ReadStatusDTO, SendMessageDTO, UnreadDTO,
};
use crate::entities::{MessageType, User};
use crate::repositories::Read;
use crate::ws::fanout;
use axum::{
    Extension, Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Lista sessioni: una riga per interlocutore, con ultimo messaggio
/// e flag non letti (il fallback HTTP della chat)
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ChatSessionDTO>>, AppError> {
    let sessions = state.msg.list_sessions(current_user.user_id).await?;
    debug!("Listed {} chat sessions", sessions.len());
    Ok(Json(sessions))
}

/// Creazione messaggio. Accetta JSON ({receiver, content}) oppure
/// multipart (receiver, content opzionale, file). Dopo il commit spinge
/// l'evento alle connessioni vive del destinatario e l'hint di refresh
/// a entrambe le parti.
#[axum_macros::debug_handler]
#[instrument(skip(state, current_user, req), fields(user_id = %current_user.user_id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    req: Request,
) -> Result<impl IntoResponse, AppError> {
    // 1. Capire dal Content-Type se il body è JSON o multipart
    // 2. Validare destinatario e contenuto
    // 3. Salvare messaggio (ed eventuale file)
    // 4. Fanout verso le connessioni vive
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let (receiver_id, content, file) = if is_multipart {
        parse_multipart_message(req, &state).await?
    } else {
        let Json(body) = Json::<SendMessageDTO>::from_request(req, &state)
            .await
            .map_err(|_| AppError::bad_request("Invalid message body"))?;
        (body.receiver, body.content.unwrap_or_default(), None)
    };

    if receiver_id == current_user.user_id {
        return Err(AppError::bad_request("Cannot send a message to yourself"));
    }

    let receiver = state
        .user
        .read(&receiver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Receiver not found"))?;

    let content = content.trim().to_string();
    if content.is_empty() && file.is_none() {
        return Err(AppError::bad_request(
            "Message must contain content or a file",
        ));
    }

    let message_type = if file.is_some() {
        MessageType::File
    } else {
        MessageType::Text
    };

    let message = state
        .msg
        .create_message(current_user.user_id, receiver.user_id, &content, message_type)
        .await?;

    let file_upload = match file {
        Some((file_name, bytes)) => {
            let relative_path =
                super::store_file(&state.media_root, "chat_files", &file_name, &bytes).await?;
            Some(state.msg.attach_file(message.message_id, &relative_path).await?)
        }
        None => None,
    };

    let dto = MessageDTO::from_message(message, file_upload);

    info!(message_id = dto.id, "Message stored, fanning out");
    fanout::push_new_message(&state, &dto);

    Ok((StatusCode::CREATED, Json(dto)))
}

async fn parse_multipart_message(
    req: Request,
    state: &Arc<AppState>,
) -> Result<(i64, String, Option<(String, Vec<u8>)>), AppError> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?;

    let mut receiver: Option<i64> = None;
    let mut content = String::new();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("receiver") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Invalid receiver field"))?;
                receiver = Some(
                    value
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| AppError::bad_request("Receiver must be a user id"))?,
                );
            }
            Some("content") => {
                content = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Invalid content field"))?;
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read uploaded file"))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let receiver = receiver.ok_or_else(|| AppError::bad_request("Receiver is required"))?;
    Ok((receiver, content, file))
}

/// History completa con un partner, dal più vecchio al più recente
#[instrument(skip(state, current_user), fields(partner_id = %partner_id, user_id = %current_user.user_id))]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(partner_id): Path<i64>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    state
        .user
        .read(&partner_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let rows = state
        .msg
        .history_between(current_user.user_id, partner_id)
        .await?;
    debug!("Loaded {} messages", rows.len());

    let messages = rows
        .into_iter()
        .map(|row| {
            let (message, file) = row.split();
            let is_sender = message.sender_id == current_user.user_id;
            let mut dto = MessageDTO::from_message(message, file);
            dto.is_sender = Some(is_sender);
            dto
        })
        .collect();

    Ok(Json(messages))
}

/// Cuore dell'aggregatore di lettura, condiviso tra REST e WebSocket:
/// marca i messaggi del partner come letti e ricalcola i flag.
pub async fn mark_read_and_aggregate(
    state: &AppState,
    user_id: i64,
    partner_id: i64,
) -> Result<ReadStatusDTO, AppError> {
    let marked = state.msg.mark_read_from(partner_id, user_id).await?;
    debug!(marked, "Messages marked as read");

    let has_unread = state.msg.has_unread_from(partner_id, user_id).await?;
    let any_unread_sessions = state.msg.has_any_unread(user_id).await?;

    Ok(ReadStatusDTO {
        chat_id: partner_id,
        has_unread,
        all_read: !any_unread_sessions,
        any_unread_sessions,
    })
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<MarkReadDTO>,
) -> Result<Json<ReadStatusDTO>, AppError> {
    let status = mark_read_and_aggregate(&state, current_user.user_id, body.chat_id).await?;

    if status.has_unread {
        // non dovrebbe succedere: l'update è appena passato
        warn!("Unread messages still present after mark_read");
    }

    Ok(Json(status))
}

/// Segnale aggregato "ho non letti da qualcuno", per il badge in navbar
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn unread_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<UnreadDTO>, AppError> {
    let any_unread = state.msg.has_any_unread(current_user.user_id).await?;
    Ok(Json(UnreadDTO { any_unread }))
}
