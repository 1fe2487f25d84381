//! Enrollment DTOs - Data Transfer Objects per le iscrizioni

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Iscrizione con titolo del corso e nome dello studente risolti via join
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct EnrollmentDTO {
    pub id: i64,
    pub course_id: i64,
    pub course: String,
    pub student_id: i64,
    pub student_name: String,
    pub enrolled_at: DateTime<Utc>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Rimozione in blocco di studenti da un corso
#[derive(Serialize, Deserialize, Debug)]
pub struct BulkRemoveDTO {
    pub student_ids: Vec<i64>,
}
