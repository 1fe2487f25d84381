//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::repositories::{
    CourseRepository, EnrollmentRepository, FeedbackRepository, MaterialRepository,
    MessageRepository, NotificationRepository, UserRepository,
};
use crate::ws::usermap::UserMap;
use sqlx::SqlitePool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione dei corsi
    pub course: CourseRepository,

    /// Repository per la gestione dei materiali didattici
    pub material: MaterialRepository,

    /// Repository per la gestione delle iscrizioni
    pub enrollment: EnrollmentRepository,

    /// Repository per la gestione dei feedback
    pub feedback: FeedbackRepository,

    /// Repository per la gestione dei messaggi di chat
    pub msg: MessageRepository,

    /// Repository per la gestione delle notifiche
    pub notification: NotificationRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Directory radice per i file caricati (foto, materiali, allegati)
    pub media_root: String,

    /// Registro delle connessioni WebSocket di chat per utente
    pub chat_online: UserMap,

    /// Registro delle connessioni WebSocket di notifica per utente
    pub notify_online: UserMap,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito.
    pub fn new(pool: SqlitePool, jwt_secret: String, media_root: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            course: CourseRepository::new(pool.clone()),
            material: MaterialRepository::new(pool.clone()),
            enrollment: EnrollmentRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            notification: NotificationRepository::new(pool),
            jwt_secret,
            media_root,
            chat_online: UserMap::new(),
            notify_online: UserMap::new(),
        }
    }
}
