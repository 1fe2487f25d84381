//! Feedback DTOs - Data Transfer Objects per i feedback dei corsi

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct FeedbackDTO {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateFeedbackDTO {
    #[validate(length(min = 1, max = 2000, message = "Comment must be between 1 and 2000 characters"))]
    pub comment: String,
}
