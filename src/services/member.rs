//! Member services - Elenco e ricerca utenti della piattaforma

use crate::core::auth::require_teacher;
use crate::core::{AppError, AppState};
use crate::dtos::{CourseRefDTO, SearchQuery, UserDTO, UserDetailDTO};
use crate::entities::User;
use crate::repositories::Read;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Lista di tutti gli utenti tranne il chiamante. Riservata ai docenti.
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    require_teacher(&current_user)?;

    let users = state.user.list_all_except(current_user.user_id).await?;
    info!("Listed {} members", users.len());

    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

/// Ricerca per username, nome o cognome. Riservata ai docenti.
#[instrument(skip(state, current_user, params), fields(user_id = %current_user.user_id))]
pub async fn search_members(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    require_teacher(&current_user)?;

    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::bad_request("Search query is required"));
    }

    let users = state.user.search_members(query.trim()).await?;
    debug!("Found {} members matching search", users.len());

    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

/// Dettaglio di un utente con i corsi associati:
/// corsi attivi tenuti per i docenti, iscrizioni in corso per gli studenti.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDetailDTO>, AppError> {
    let user = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let courses = if user.is_teacher() {
        state
            .course
            .list_by_teacher(user.user_id)
            .await?
            .into_iter()
            .filter(|c| c.is_active)
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
            .filter(|e| !e.is_completed)
            .map(|e| CourseRefDTO {
                id: e.course_id,
                name: e.course,
                is_active: true,
            })
            .collect()
    };

    Ok(Json(UserDetailDTO {
        id: user.user_id,
        username: user.username,
        role: user.role,
        first_name: user.first_name,
        last_name: user.last_name,
        photo: user.photo,
        status: user.status,
        courses,
    }))
}
