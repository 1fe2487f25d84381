//! MaterialRepository - Repository per i materiali didattici

use crate::entities::CourseMaterial;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

pub struct MaterialRepository {
    connection_pool: SqlitePool,
}

impl MaterialRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_material(
        &self,
        course_id: i64,
        title: &str,
        file_path: &str,
    ) -> Result<CourseMaterial, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO course_materials (course_id, title, file_path, uploaded_at, is_active) \
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(course_id)
        .bind(title)
        .bind(file_path)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(CourseMaterial {
            material_id: result.last_insert_rowid(),
            course_id,
            title: title.to_string(),
            file_path: file_path.to_string(),
            uploaded_at: now,
            is_active: true,
        })
    }

    /// Solo i materiali attivi, dal più recente
    pub async fn list_active_by_course(&self, course_id: i64) -> Result<Vec<CourseMaterial>, Error> {
        let materials = sqlx::query_as::<_, CourseMaterial>(
            "SELECT material_id, course_id, title, file_path, uploaded_at, is_active \
             FROM course_materials WHERE course_id = ? AND is_active = 1 \
             ORDER BY uploaded_at DESC, material_id DESC",
        )
        .bind(course_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(materials)
    }

    /// Soft delete: il file resta sul disco, il materiale sparisce dalle liste.
    /// Ritorna il numero di righe toccate (0 se il materiale non esiste).
    pub async fn soft_delete(&self, material_id: i64, course_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE course_materials SET is_active = 0 \
             WHERE material_id = ? AND course_id = ? AND is_active = 1",
        )
        .bind(material_id)
        .bind(course_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected())
    }
}
