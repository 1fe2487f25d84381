//! Course services - Gestione operazioni sui corsi

use crate::core::auth::{require_course_teacher, require_teacher};
use crate::core::{AppError, AppState};
use crate::dtos::{CourseDTO, CreateCourseDTO, SearchQuery, UpdateCourseDTO};
use crate::entities::User;
use crate::repositories::{Delete, Update};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Lista dei corsi attivi, dal più recentemente aggiornato
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<CourseDTO>>, AppError> {
    let courses = state.course.list_active().await?;
    debug!("Listed {} active courses", courses.len());
    Ok(Json(courses))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateCourseDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Solo i docenti possono creare corsi
    // 2. Validare titolo e descrizione
    // 3. Il creatore diventa il docente del corso
    require_teacher(&current_user)?;
    body.validate()?;

    let course = state.course.create_course(current_user.user_id, &body).await?;

    info!("Course '{}' created", course.title);
    let dto = CourseDTO {
        id: course.course_id,
        title: course.title,
        description: course.description,
        teacher_id: course.teacher_id,
        teacher_name: current_user.full_name(),
        created_at: course.created_at,
        updated_at: course.updated_at,
        is_active: course.is_active,
    };

    Ok((StatusCode::CREATED, Json(dto)))
}

/// Ricerca per titolo: i corsi inattivi compaiono solo per il loro docente
#[instrument(skip(state, current_user, params), fields(user_id = %current_user.user_id))]
pub async fn search_courses(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<CourseDTO>>, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::bad_request("Search query is required"));
    }

    let courses = state.course.search(query.trim(), current_user.user_id).await?;
    debug!("Found {} courses matching search", courses.len());
    Ok(Json(courses))
}

/// Dettaglio corso: un corso inattivo è visibile solo al suo docente
#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseDTO>, AppError> {
    let course = state
        .course
        .detail(course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    if !course.is_active && course.teacher_id != current_user.user_id {
        warn!("Access to inactive course denied");
        return Err(AppError::forbidden(
            "You do not have permission to access this inactive course",
        ));
    }

    Ok(Json(course))
}

#[instrument(skip(state, current_user, body), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
    Json(body): Json<UpdateCourseDTO>,
) -> Result<Json<CourseDTO>, AppError> {
    require_course_teacher(&state, course_id, &current_user).await?;
    body.validate()?;

    state.course.update(&course_id, &body).await?;

    // rileggiamo la proiezione completa per il client
    let course = state
        .course
        .detail(course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    info!("Course updated");
    Ok(Json(course))
}

#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_course_teacher(&state, course_id, &current_user).await?;

    state.course.delete(&course_id).await?;

    info!("Course deleted");
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Course deleted successfully"
    })))
}

#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn toggle_activation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_course_teacher(&state, course_id, &current_user).await?;

    let is_active = state.course.toggle_activation(course_id).await?;

    info!(is_active, "Course activation toggled");
    Ok(Json(serde_json::json!({
        "status": "success",
        "is_active": is_active,
        "message": format!(
            "Course {} successfully",
            if is_active { "activated" } else { "deactivated" }
        )
    })))
}
