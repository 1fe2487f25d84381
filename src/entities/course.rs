//! Course entities - Corsi, materiali, iscrizioni e feedback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Course {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Materiale didattico caricato dal docente. La cancellazione è soft:
/// is_active passa a false e il file resta sul disco.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CourseMaterial {
    pub material_id: i64,
    pub course_id: i64,
    pub title: String,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Enrollment {
    pub enrollment_id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Feedback {
    pub feedback_id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
