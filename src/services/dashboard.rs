//! Dashboard services - Profilo dell'utente autenticato

use crate::core::{AppError, AppState};
use crate::dtos::{CourseRefDTO, DashboardDTO, UpdateStatusDTO};
use crate::entities::User;
use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Corsi da mostrare in dashboard: tenuti per i docenti (prima gli attivi),
/// iscrizioni per gli studenti (prima le non completate).
async fn user_course_refs(state: &AppState, user: &User) -> Result<Vec<CourseRefDTO>, AppError> {
    let refs = if user.is_teacher() {
        state
            .course
            .list_by_teacher(user.user_id)
            .await?
            .into_iter()
            .map(|c| CourseRefDTO {
                id: c.course_id,
                name: c.title,
                is_active: c.is_active,
            })
            .collect()
    } else {
        state
            .enrollment
            .list_by_student(user.user_id)
            .await?
            .into_iter()
            .map(|e| CourseRefDTO {
                id: e.course_id,
                name: e.course,
                is_active: !e.is_completed,
            })
            .collect()
    };

    Ok(refs)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<DashboardDTO>, AppError> {
    debug!("Building dashboard");
    let courses = user_course_refs(&state, &current_user).await?;

    Ok(Json(DashboardDTO {
        id: current_user.user_id,
        username: current_user.username,
        first_name: current_user.first_name,
        last_name: current_user.last_name,
        role: current_user.role,
        photo: current_user.photo,
        status: current_user.status,
        courses,
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn patch_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateStatusDTO>,
) -> Result<Json<serde_json::Value>, AppError> {
    // 1. Lo status deve essere presente e non vuoto
    // 2. Massimo 255 caratteri
    // 3. Aggiornare e ritornare il nuovo valore
    let status = body.status.trim();
    if status.is_empty() {
        return Err(AppError::bad_request("Status is required"));
    }
    if status.len() > 255 {
        return Err(AppError::bad_request(
            "Status description is too long (maximum 255 characters)",
        ));
    }

    state.user.update_status(current_user.user_id, status).await?;

    info!("Status updated");
    Ok(Json(serde_json::json!({ "status": status })))
}

#[instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user_id))]
pub async fn patch_photo(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    // 1. Cercare il campo multipart "photo"
    // 2. Salvare il file sotto profile_photos/
    // 3. Aggiornare il path sul profilo e ritornare l'URL pubblico
    let mut photo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        let field_name = field.name().map(|n| n.to_string());
        if field_name.as_deref() == Some("photo") {
            let file_name = field.file_name().unwrap_or("photo").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| AppError::bad_request("Failed to read uploaded photo"))?;
            photo = Some((file_name, bytes.to_vec()));
        }
    }

    let Some((file_name, bytes)) = photo else {
        warn!("Photo update attempted without photo field");
        return Err(AppError::bad_request("No photo provided in the request"));
    };

    let relative_path =
        super::store_file(&state.media_root, "profile_photos", &file_name, &bytes).await?;
    state
        .user
        .update_photo(current_user.user_id, &relative_path)
        .await?;

    info!("Profile photo updated");
    Ok(Json(
        serde_json::json!({ "photo": format!("/uploads/{}", relative_path) }),
    ))
}
