//! EnrollmentRepository - Repository per le iscrizioni ai corsi

use crate::dtos::EnrollmentDTO;
use crate::entities::Enrollment;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const ENROLLMENT_COLUMNS: &str =
    "enrollment_id, student_id, course_id, enrolled_at, is_completed, completed_at";

const ENROLLMENT_DTO_SELECT: &str = "SELECT e.enrollment_id AS id, e.course_id, c.title AS course, \
     e.student_id, \
     CASE WHEN TRIM(u.first_name || ' ' || u.last_name) = '' THEN u.username \
          ELSE TRIM(u.first_name || ' ' || u.last_name) END AS student_name, \
     e.enrolled_at, e.is_completed, e.completed_at \
     FROM enrollments e \
     JOIN users u ON u.user_id = e.student_id \
     JOIN courses c ON c.course_id = e.course_id";

pub struct EnrollmentRepository {
    connection_pool: SqlitePool,
}

impl EnrollmentRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO enrollments (student_id, course_id, enrolled_at, is_completed) \
             VALUES (?, ?, ?, 0)",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Enrollment {
            enrollment_id: result.last_insert_rowid(),
            student_id,
            course_id,
            enrolled_at: now,
            is_completed: false,
            completed_at: None,
        })
    }

    pub async fn exists(&self, student_id: i64, course_id: i64) -> Result<bool, Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE student_id = ? AND course_id = ?)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(exists)
    }

    pub async fn find(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, Error> {
        let query = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = ? AND course_id = ?"
        );
        let enrollment = sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(enrollment)
    }

    /// Ritorna il numero di righe cancellate (0 = non iscritto)
    pub async fn delete_by_student_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM enrollments WHERE student_id = ? AND course_id = ?")
            .bind(student_id)
            .bind(course_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Rimozione in blocco decisa dal docente del corso
    pub async fn bulk_delete(&self, course_id: i64, student_ids: &[i64]) -> Result<u64, Error> {
        if student_ids.is_empty() {
            return Ok(0);
        }

        // IN (?) con placeholder generati: sqlx non espande le slice da solo
        let placeholders = vec!["?"; student_ids.len()].join(", ");
        let query = format!(
            "DELETE FROM enrollments WHERE course_id = ? AND student_id IN ({placeholders})"
        );

        let mut q = sqlx::query(&query).bind(course_id);
        for student_id in student_ids {
            q = q.bind(student_id);
        }

        let result = q.execute(&self.connection_pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn list_by_course(&self, course_id: i64) -> Result<Vec<EnrollmentDTO>, Error> {
        let query = format!(
            "{ENROLLMENT_DTO_SELECT} WHERE e.course_id = ? \
             ORDER BY e.enrolled_at DESC, e.enrollment_id DESC"
        );
        let enrollments = sqlx::query_as::<_, EnrollmentDTO>(&query)
            .bind(course_id)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(enrollments)
    }

    /// Iscrizioni di uno studente, prima quelle non completate
    pub async fn list_by_student(&self, student_id: i64) -> Result<Vec<EnrollmentDTO>, Error> {
        let query = format!(
            "{ENROLLMENT_DTO_SELECT} WHERE e.student_id = ? \
             ORDER BY e.is_completed ASC, e.enrollment_id DESC"
        );
        let enrollments = sqlx::query_as::<_, EnrollmentDTO>(&query)
            .bind(student_id)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(enrollments)
    }

    /// Inverte il flag di completamento e allinea completed_at
    pub async fn toggle_completion(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, Error> {
        let Some(current) = self.find(student_id, course_id).await? else {
            return Ok(None);
        };

        let is_completed = !current.is_completed;
        let completed_at = if is_completed { Some(Utc::now()) } else { None };

        sqlx::query(
            "UPDATE enrollments SET is_completed = ?, completed_at = ? WHERE enrollment_id = ?",
        )
        .bind(is_completed)
        .bind(completed_at)
        .bind(current.enrollment_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(Some(Enrollment {
            is_completed,
            completed_at,
            ..current
        }))
    }

    /// Id degli studenti iscritti, per il fanout delle notifiche
    pub async fn student_ids_by_course(&self, course_id: i64) -> Result<Vec<i64>, Error> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT student_id FROM enrollments WHERE course_id = ?")
                .bind(course_id)
                .fetch_all(&self.connection_pool)
                .await?;

        Ok(ids)
    }
}
