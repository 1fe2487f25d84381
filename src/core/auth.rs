use crate::core::{AppError, AppState};
use crate::entities::{Course, User};
use crate::repositories::Read;
use axum::{Error, body::Body, extract::Request, extract::State, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i64,
    pub username: String,
}

#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(username: String, id: i64, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username,
        id,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Middleware di autenticazione: estrae il Bearer token, lo decodifica e
/// carica l'utente dal database inserendolo nelle Extension della request.
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden(
                "Please add the JWT token to the header",
            ));
        }
    };

    let mut header = auth_header.split_whitespace();
    let (_bearer, token) = (header.next(), header.next());
    let token = token.ok_or_else(|| {
        warn!("Malformed authorization header");
        AppError::unauthorized("Malformed authorization header")
    })?;

    let token_data = match decode_jwt(token, &state.jwt_secret) {
        Ok(data) => data,
        Err(_) => {
            warn!("Failed to decode JWT token");
            return Err(AppError::unauthorized("Unable to decode token"));
        }
    };

    // Fetch the user details from the database
    let current_user = match state
        .user
        .find_by_username(&token_data.claims.username)
        .await?
    {
        Some(user) => {
            debug!("User authenticated: {}", user.username);
            user
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.username);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Autentica una connessione WebSocket: il token arriva nella query string
/// (i client WebSocket non possono impostare header custom).
pub async fn authenticate_ws_token(
    state: &AppState,
    token: Option<&str>,
) -> Result<User, AppError> {
    let token = token.ok_or_else(|| {
        warn!("WebSocket connection attempted without token");
        AppError::unauthorized("Missing token")
    })?;

    let token_data = decode_jwt(token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;

    state
        .user
        .find_by_username(&token_data.claims.username)
        .await?
        .ok_or_else(|| {
            warn!("WebSocket token for unknown user");
            AppError::unauthorized("You are not an authorized user")
        })
}

/// Verifica che l'utente corrente abbia il ruolo docente
pub fn require_teacher(user: &User) -> Result<(), AppError> {
    if user.is_teacher() {
        Ok(())
    } else {
        warn!("User {} is not a teacher", user.user_id);
        Err(AppError::forbidden("Only teachers can perform this action"))
    }
}

/// Verifica che l'utente corrente abbia il ruolo studente
pub fn require_student(user: &User) -> Result<(), AppError> {
    if user.is_student() {
        Ok(())
    } else {
        warn!("User {} is not a student", user.user_id);
        Err(AppError::forbidden("Only students can perform this action"))
    }
}

/// Verifica che l'utente sia il docente del corso indicato.
/// Ritorna il corso per evitare una seconda lettura negli handler.
#[instrument(skip(state, user), fields(course_id = %course_id, user_id = %user.user_id))]
pub async fn require_course_teacher(
    state: &AppState,
    course_id: i64,
    user: &User,
) -> Result<Course, AppError> {
    let course = state
        .course
        .read(&course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    if course.teacher_id != user.user_id || !user.is_teacher() {
        warn!("User {} is not the teacher of course {}", user.user_id, course_id);
        return Err(AppError::forbidden(
            "Only the course teacher can perform this action",
        ));
    }

    Ok(course)
}

/// Verifica che l'utente sia il docente del corso oppure uno studente iscritto
#[instrument(skip(state, user), fields(course_id = %course_id, user_id = %user.user_id))]
pub async fn require_course_access(
    state: &AppState,
    course_id: i64,
    user: &User,
) -> Result<Course, AppError> {
    let course = state
        .course
        .read(&course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    if user.is_teacher() && course.teacher_id == user.user_id {
        return Ok(course);
    }

    if user.is_student() && state.enrollment.exists(user.user_id, course_id).await? {
        return Ok(course);
    }

    warn!(
        "User {} has no access to course {} (not teacher, not enrolled)",
        user.user_id, course_id
    );
    Err(AppError::forbidden(
        "You must be the course teacher or an enrolled student",
    ))
}

/// Verifica che l'utente sia uno studente iscritto al corso
#[instrument(skip(state, user), fields(course_id = %course_id, user_id = %user.user_id))]
pub async fn require_enrolled_student(
    state: &AppState,
    course_id: i64,
    user: &User,
) -> Result<Course, AppError> {
    require_student(user)?;

    let course = state
        .course
        .read(&course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

    if !state.enrollment.exists(user.user_id, course_id).await? {
        info!("User {} is not enrolled in course {}", user.user_id, course_id);
        return Err(AppError::forbidden("You are not enrolled in this course"));
    }

    Ok(course)
}
