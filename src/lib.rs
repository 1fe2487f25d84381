//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod monitoring;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use crate::services::root;

use axum::{
    Router, middleware,
    routing::{any, delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    let media_root = state.media_root.clone();

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes(state.clone()))
        .nest("/dashboard", configure_dashboard_routes(state.clone()))
        .nest("/members", configure_member_routes(state.clone()))
        .nest("/courses", configure_course_routes(state.clone()))
        .nest("/chat", configure_chat_routes(state.clone()))
        .nest(
            "/notifications",
            configure_notification_routes(state.clone()),
        )
        // i WebSocket si autenticano da soli col token in query string
        .route("/ws/chat", any(ws::chat_ws_handler))
        .route("/ws/notifications", any(ws::notification_ws_handler))
        .nest_service("/uploads", ServeDir::new(media_root))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register, logout)
fn configure_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    let public_routes = Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user));

    let private_routes = Router::new()
        .route("/logout", post(logout_user))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(private_routes)
}

/// Configura le routes della dashboard personale
fn configure_dashboard_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(get_dashboard))
        .route("/status", patch(patch_status))
        .route("/photo", patch(patch_photo))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes per elenco e ricerca membri
fn configure_member_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_members))
        .route("/search", get(search_members))
        .route("/{user_id}", get(get_member))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes dei corsi e delle risorse annidate
/// (materiali, feedback, iscrizioni, avanzamento)
fn configure_course_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/search", get(search_courses))
        .route(
            "/{course_id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/{course_id}/toggle_activation", patch(toggle_activation))
        .route(
            "/{course_id}/materials",
            get(list_materials).post(upload_material),
        )
        .route(
            "/{course_id}/materials/{material_id}",
            delete(delete_material),
        )
        .route(
            "/{course_id}/feedback",
            get(list_feedback).post(create_feedback),
        )
        .route(
            "/{course_id}/feedback/{feedback_id}",
            delete(delete_feedback),
        )
        .route(
            "/{course_id}/enrollments",
            get(list_enrollments).delete(bulk_remove_enrollments),
        )
        .route(
            "/{course_id}/enroll",
            post(enroll_student).delete(unenroll_student),
        )
        .route("/{course_id}/progress", patch(toggle_progress))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes della chat (fallback HTTP del doppio trasporto)
fn configure_chat_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_sessions).post(send_message))
        .route("/unread", get(unread_status))
        .route("/mark_read", post(mark_read))
        .route("/{partner_id}", get(get_history))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes delle notifiche
fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_notifications))
        .route("/mark_all_read", post(mark_all_read))
        .route("/{notification_id}", patch(mark_notification_read))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
