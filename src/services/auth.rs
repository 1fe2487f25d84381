//! Auth services - Gestione autenticazione e registrazione utenti

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{AuthResponseDTO, LoginDTO, RegisterDTO, UserDTO};
use crate::entities::User;
use crate::repositories::Create;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, instrument, warn};

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{3,50}$").unwrap();
}

/// Username: 3-50 caratteri, solo alfanumerici e underscore
fn validate_username(username: &str) -> Result<(), AppError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Username must be 3-50 characters, letters, digits and underscores only",
        ))
    }
}

/// Password: almeno 8 caratteri con maiuscola, minuscola e cifra
fn validate_password(password: &str) -> Result<(), AppError> {
    let long_enough = password.len() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Password must be at least 8 characters with uppercase, lowercase and a digit",
        ))
    }
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validare username e password (formato, lunghezza, complessità)
    // 2. Controllare che lo username non sia già usato -> CONFLICT
    // 3. Hashare la password prima di salvarla
    // 4. Creare l'utente e generare il token di accesso
    // 5. Rispondere 201 con token, profilo e header Authorization
    validate_username(&body.username)?;
    validate_password(&body.password)?;

    if state.user.find_by_username(&body.username).await?.is_some() {
        warn!("Registration attempted with existing username");
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = User::hash_password(&body.password)
        .map_err(|_| AppError::internal_server_error("Failed to hash password"))?;

    let new_user = RegisterDTO {
        password: password_hash,
        ..body
    };

    let created_user = state.user.create(&new_user).await?;
    let token = encode_jwt(
        created_user.username.clone(),
        created_user.user_id,
        &state.jwt_secret,
    )?;

    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    info!("User registered successfully");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponseDTO {
            access: token,
            user: UserDTO::from(created_user),
        }),
    ))
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Cercare l'utente per username
    // 2. Verificare la password contro l'hash salvato
    // 3. Stesso errore generico per utente inesistente e password errata
    // 4. Generare il token e rispondere con cookie + header Authorization
    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) => user,
        None => {
            warn!("Login attempted with unknown username");
            return Err(AppError::unauthorized("Invalid username or password"));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Login attempted with wrong password");
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let token = encode_jwt(user.username.clone(), user.user_id, &state.jwt_secret)?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token,
        24 * 60 * 60
    );

    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", HeaderValue::from_str(&cookie_value).unwrap());
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    info!("User logged in successfully");
    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponseDTO {
            access: token,
            user: UserDTO::from(user),
        }),
    ))
}

/// Non esistono refresh token da invalidare: il logout azzera il cookie
/// e il client scarta il token di accesso.
#[instrument(skip(current_user), fields(user_id = %current_user.user_id))]
pub async fn logout_user(
    axum::Extension(current_user): axum::Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let cookie = "token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", HeaderValue::from_str(cookie).unwrap());

    info!("User logged out");
    Ok((
        StatusCode::OK,
        headers,
        Json(serde_json::json!({ "detail": "Successfully logged out" })),
    ))
}
