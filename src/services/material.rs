//! Material services - Materiali didattici dei corsi

use crate::core::auth::{require_course_access, require_course_teacher};
use crate::core::{AppError, AppState};
use crate::dtos::MaterialDTO;
use crate::entities::User;
use crate::services::notification::create_notification;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Materiali attivi del corso, visibili a docente e iscritti
#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn list_materials(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<MaterialDTO>>, AppError> {
    require_course_access(&state, course_id, &current_user).await?;

    let materials = state.material.list_active_by_course(course_id).await?;
    debug!("Listed {} materials", materials.len());

    Ok(Json(materials.into_iter().map(MaterialDTO::from).collect()))
}

#[instrument(skip(state, current_user, multipart), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn upload_material(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // 1. Solo il docente del corso può caricare materiali
    // 2. Il form deve contenere titolo e file
    // 3. Salvare il file e registrare il materiale
    // 4. Notificare tutti gli studenti iscritti
    let course = require_course_teacher(&state, course_id, &current_user).await?;

    let mut title: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("title") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Invalid title field"))?;
                title = Some(value);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("material").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read uploaded file"))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Material title is required"))?;
    let (file_name, bytes) =
        file.ok_or_else(|| AppError::bad_request("Material file is required"))?;

    let relative_path =
        super::store_file(&state.media_root, "course_materials", &file_name, &bytes).await?;
    let material = state
        .material
        .create_material(course_id, title.trim(), &relative_path)
        .await?;

    info!("Material '{}' uploaded", material.title);

    // Fanout delle notifiche agli iscritti: un fallimento qui non deve
    // far fallire l'upload già concluso.
    let message = format!(
        "A new material has been uploaded to your course: {}",
        course.title
    );
    let student_ids = state.enrollment.student_ids_by_course(course_id).await?;
    let results = join_all(
        student_ids
            .iter()
            .map(|&student_id| create_notification(&state, student_id, message.clone())),
    )
    .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, "Some enrollment notifications could not be created");
    }

    Ok((StatusCode::CREATED, Json(MaterialDTO::from(material))))
}

/// Soft delete: il materiale sparisce dalle liste ma il file resta
#[instrument(skip(state, current_user), fields(course_id = %course_id, material_id = %material_id, user_id = %current_user.user_id))]
pub async fn delete_material(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path((course_id, material_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_course_teacher(&state, course_id, &current_user).await?;

    let affected = state.material.soft_delete(material_id, course_id).await?;
    if affected == 0 {
        return Err(AppError::not_found("Material not found"));
    }

    info!("Material soft-deleted");
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Material deleted successfully"
    })))
}
