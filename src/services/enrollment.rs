//! Enrollment services - Iscrizioni ai corsi e avanzamento

use crate::core::auth::{
    require_course_access, require_course_teacher, require_enrolled_student, require_student,
};
use crate::core::{AppError, AppState};
use crate::dtos::{BulkRemoveDTO, EnrollmentDTO};
use crate::entities::User;
use crate::repositories::Read;
use crate::services::notification::create_notification;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Iscritti al corso, visibili a docente e studenti iscritti
#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<EnrollmentDTO>>, AppError> {
    require_course_access(&state, course_id, &current_user).await?;

    let enrollments = state.enrollment.list_by_course(course_id).await?;
    debug!("Listed {} enrollments", enrollments.len());

    Ok(Json(enrollments))
}

/// Rimozione in blocco di studenti, riservata al docente del corso
#[instrument(skip(state, current_user, body), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn bulk_remove_enrollments(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
    Json(body): Json<BulkRemoveDTO>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_course_teacher(&state, course_id, &current_user).await?;

    if body.student_ids.is_empty() {
        return Err(AppError::bad_request("No student IDs provided"));
    }

    let removed = state
        .enrollment
        .bulk_delete(course_id, &body.student_ids)
        .await?;

    info!(removed, "Enrollments removed by teacher");
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": format!("Successfully removed {} student(s) from the course", removed)
    })))
}

#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn enroll_student(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Solo gli studenti possono iscriversi
    // 2. Il corso deve esistere ed essere attivo
    // 3. Nessuna doppia iscrizione
    // 4. Notificare il docente del corso
    require_student(&current_user)?;

    let course = state
        .course
        .read(&course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    if !course.is_active {
        warn!("Enrollment attempted in inactive course");
        return Err(AppError::bad_request("Cannot enroll in an inactive course"));
    }

    if state.enrollment.exists(current_user.user_id, course_id).await? {
        return Err(AppError::bad_request("Already enrolled in this course"));
    }

    let enrollment = state
        .enrollment
        .create_enrollment(current_user.user_id, course_id)
        .await?;

    info!("Student enrolled in course '{}'", course.title);

    let message = format!(
        "{} has enrolled in your course: {}",
        current_user.full_name(),
        course.title
    );
    if create_notification(&state, course.teacher_id, message).await.is_err() {
        warn!("Failed to notify teacher about enrollment");
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Successfully enrolled in the course",
            "enrollment_id": enrollment.enrollment_id
        })),
    ))
}

#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn unenroll_student(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_student(&current_user)?;

    let course = state
        .course
        .read(&course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    let removed = state
        .enrollment
        .delete_by_student_course(current_user.user_id, course_id)
        .await?;
    if removed == 0 {
        return Err(AppError::not_found("Not enrolled in this course"));
    }

    info!("Student left course '{}'", course.title);

    let message = format!(
        "{} has left your course: {}",
        current_user.full_name(),
        course.title
    );
    if create_notification(&state, course.teacher_id, message).await.is_err() {
        warn!("Failed to notify teacher about unenrollment");
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Successfully unenrolled from the course"
    })))
}

/// Inverte lo stato di completamento del corso per lo studente iscritto
#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn toggle_progress(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let course = require_enrolled_student(&state, course_id, &current_user).await?;

    let enrollment = state
        .enrollment
        .toggle_completion(current_user.user_id, course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Not enrolled in this course"))?;

    info!(is_completed = enrollment.is_completed, "Course progress toggled");

    let enrollment_dto = EnrollmentDTO {
        id: enrollment.enrollment_id,
        course_id: enrollment.course_id,
        course: course.title,
        student_id: enrollment.student_id,
        student_name: current_user.full_name(),
        enrolled_at: enrollment.enrolled_at,
        is_completed: enrollment.is_completed,
        completed_at: enrollment.completed_at,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": format!(
            "Course marked as {}",
            if enrollment_dto.is_completed { "completed" } else { "incomplete" }
        ),
        "enrollment": enrollment_dto
    })))
}
