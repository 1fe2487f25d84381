#![allow(dead_code)]

use aula::core::AppState;
use axum_test::TestServer;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Secret JWT condiviso da tutti i test
pub const TEST_JWT_SECRET: &str = "un segreto solo per i test";

/// Crea un AppState per i test con una media root temporanea dedicata.
/// La TempDir viene dimenticata di proposito: i file caricati devono
/// restare sul disco per tutta la durata del test.
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    let dir = tempfile::tempdir().expect("Failed to create temp media dir");
    let media_root = dir.path().to_string_lossy().to_string();
    std::mem::forget(dir);

    Arc::new(AppState::new(
        pool,
        TEST_JWT_SECRET.to_string(),
        media_root,
    ))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = aula::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT valido 24 ore per l'utente indicato
pub fn create_test_jwt(user_id: i64, username: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        id: i64,
        username: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to create JWT token")
}

// Token dei quattro utenti nei fixtures
pub fn token_profrossi() -> String {
    create_test_jwt(1, "profrossi")
}

pub fn token_lbianchi() -> String {
    create_test_jwt(2, "lbianchi")
}

pub fn token_averdi() -> String {
    create_test_jwt(3, "averdi")
}

pub fn token_profneri() -> String {
    create_test_jwt(4, "profneri")
}
