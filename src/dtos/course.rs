//! Course DTOs - Data Transfer Objects per i corsi

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Proiezione di un corso con il nome del docente già risolto via join
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CourseDTO {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Riferimento compatto a un corso (liste in dashboard e dettaglio utente)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CourseRefDTO {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCourseDTO {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// Aggiornamento parziale: solo i campi Some(_) vengono modificati
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateCourseDTO {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
}
