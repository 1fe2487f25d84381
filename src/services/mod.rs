//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod chat;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod feedback;
pub mod material;
pub mod member;
pub mod notification;

// Re-exports per facilitare l'import
pub use auth::{login_user, logout_user, register_user};
pub use chat::{get_history, list_sessions, mark_read, send_message, unread_status};
pub use course::{
    create_course, delete_course, get_course, list_courses, search_courses, toggle_activation,
    update_course,
};
pub use dashboard::{get_dashboard, patch_photo, patch_status};
pub use enrollment::{
    bulk_remove_enrollments, enroll_student, list_enrollments, toggle_progress, unenroll_student,
};
pub use feedback::{create_feedback, delete_feedback, list_feedback};
pub use material::{delete_material, list_materials, upload_material};
pub use member::{get_member, list_members, search_members};
pub use notification::{list_notifications, mark_all_read, mark_notification_read};

use crate::AppState;
use crate::core::AppError;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}

/// Rende un nome file sicuro per il filesystem
pub(crate) fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Salva un file sotto media_root/subdir e ritorna il path relativo
/// (quello persistito a database e servito sotto /uploads/).
pub(crate) async fn store_file(
    media_root: &str,
    subdir: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let safe_name = sanitize_filename(original_name);
    // il timestamp evita collisioni tra upload con lo stesso nome
    let relative = format!("{}/{}_{}", subdir, Utc::now().timestamp_millis(), safe_name);

    let full_path = Path::new(media_root).join(&relative);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&full_path, bytes).await?;

    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("lezione 1.pdf"), "lezione_1.pdf");
        assert_eq!(sanitize_filename(""), "file");
    }
}
