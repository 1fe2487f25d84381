//! FeedbackRepository - Repository per i feedback dei corsi

use super::{Delete, Read};
use crate::dtos::FeedbackDTO;
use crate::entities::Feedback;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

pub struct FeedbackRepository {
    connection_pool: SqlitePool,
}

impl FeedbackRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_feedback(
        &self,
        student_id: i64,
        course_id: i64,
        comment: &str,
    ) -> Result<Feedback, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO feedbacks (student_id, course_id, comment, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(comment)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Feedback {
            feedback_id: result.last_insert_rowid(),
            student_id,
            course_id,
            comment: comment.to_string(),
            created_at: now,
        })
    }

    pub async fn list_by_course(&self, course_id: i64) -> Result<Vec<FeedbackDTO>, Error> {
        let feedbacks = sqlx::query_as::<_, FeedbackDTO>(
            "SELECT f.feedback_id AS id, f.course_id, f.student_id, \
             CASE WHEN TRIM(u.first_name || ' ' || u.last_name) = '' THEN u.username \
                  ELSE TRIM(u.first_name || ' ' || u.last_name) END AS student_name, \
             f.comment, f.created_at \
             FROM feedbacks f JOIN users u ON u.user_id = f.student_id \
             WHERE f.course_id = ? ORDER BY f.created_at DESC, f.feedback_id DESC",
        )
        .bind(course_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(feedbacks)
    }
}

impl Read<Feedback, i64> for FeedbackRepository {
    async fn read(&self, id: &i64) -> Result<Option<Feedback>, Error> {
        let feedback = sqlx::query_as::<_, Feedback>(
            "SELECT feedback_id, student_id, course_id, comment, created_at \
             FROM feedbacks WHERE feedback_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(feedback)
    }
}

impl Delete<i64> for FeedbackRepository {
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM feedbacks WHERE feedback_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}
