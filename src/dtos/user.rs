//! User DTOs - Data Transfer Objects per utenti

use crate::dtos::CourseRefDTO;
use crate::entities::{User, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// struct per gestire io col client: la password non esce mai
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub status: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            username: value.username,
            role: value.role,
            first_name: value.first_name,
            last_name: value.last_name,
            photo: value.photo,
            status: value.status,
            date_joined: value.date_joined,
        }
    }
}

/// DTO per la registrazione di un nuovo utente
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterDTO {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// DTO per il login (solo username e password)
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

/// Risposta di login/registrazione: token di accesso e profilo
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponseDTO {
    pub access: String,
    pub user: UserDTO,
}

/// Dettaglio utente con i corsi associati (tenuti per i docenti,
/// iscrizioni non completate per gli studenti)
#[derive(Serialize, Deserialize, Debug)]
pub struct UserDetailDTO {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub status: Option<String>,
    pub courses: Vec<CourseRefDTO>,
}

/// Dashboard dell'utente autenticato
#[derive(Serialize, Deserialize, Debug)]
pub struct DashboardDTO {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub photo: Option<String>,
    pub status: Option<String>,
    pub courses: Vec<CourseRefDTO>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateStatusDTO {
    pub status: String,
}
