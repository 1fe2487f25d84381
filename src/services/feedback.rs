//! Feedback services - Feedback degli studenti sui corsi

use crate::core::auth::{require_course_access, require_enrolled_student};
use crate::core::{AppError, AppState};
use crate::dtos::{CreateFeedbackDTO, FeedbackDTO};
use crate::entities::User;
use crate::repositories::{Delete, Read};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Feedback del corso, visibili a docente e studenti iscritti
#[instrument(skip(state, current_user), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<FeedbackDTO>>, AppError> {
    require_course_access(&state, course_id, &current_user).await?;

    let feedbacks = state.feedback.list_by_course(course_id).await?;
    debug!("Listed {} feedbacks", feedbacks.len());

    Ok(Json(feedbacks))
}

/// Solo gli studenti iscritti possono lasciare feedback
#[instrument(skip(state, current_user, body), fields(course_id = %course_id, user_id = %current_user.user_id))]
pub async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(course_id): Path<i64>,
    Json(body): Json<CreateFeedbackDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_enrolled_student(&state, course_id, &current_user).await?;
    body.validate()?;

    let feedback = state
        .feedback
        .create_feedback(current_user.user_id, course_id, body.comment.trim())
        .await?;

    info!("Feedback created");
    let dto = FeedbackDTO {
        id: feedback.feedback_id,
        course_id: feedback.course_id,
        student_id: feedback.student_id,
        student_name: current_user.full_name(),
        comment: feedback.comment,
        created_at: feedback.created_at,
    };

    Ok((StatusCode::CREATED, Json(dto)))
}

/// Solo l'autore di un feedback può cancellarlo
#[instrument(skip(state, current_user), fields(course_id = %course_id, feedback_id = %feedback_id, user_id = %current_user.user_id))]
pub async fn delete_feedback(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path((course_id, feedback_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let feedback = state
        .feedback
        .read(&feedback_id)
        .await?
        .filter(|f| f.course_id == course_id)
        .ok_or_else(|| AppError::not_found("Feedback not found"))?;

    if feedback.student_id != current_user.user_id {
        warn!("Feedback deletion attempted by non-owner");
        return Err(AppError::forbidden("Only the feedback author can delete it"));
    }

    state.feedback.delete(&feedback_id).await?;

    info!("Feedback deleted");
    Ok(Json(serde_json::json!({ "status": "success" })))
}
