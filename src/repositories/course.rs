//! CourseRepository - Repository per la gestione dei corsi

use super::{Delete, Read, Update};
use crate::dtos::{CourseDTO, CreateCourseDTO, UpdateCourseDTO};
use crate::entities::Course;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const COURSE_COLUMNS: &str =
    "course_id, title, description, teacher_id, created_at, updated_at, is_active";

// Proiezione con il nome del docente, riusata da lista/dettaglio/ricerca
const COURSE_DTO_SELECT: &str = "SELECT c.course_id AS id, c.title, c.description, \
     c.teacher_id, \
     CASE WHEN TRIM(u.first_name || ' ' || u.last_name) = '' THEN u.username \
          ELSE TRIM(u.first_name || ' ' || u.last_name) END AS teacher_name, \
     c.created_at, c.updated_at, c.is_active \
     FROM courses c JOIN users u ON u.user_id = c.teacher_id";

pub struct CourseRepository {
    connection_pool: SqlitePool,
}

impl CourseRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_course(
        &self,
        teacher_id: i64,
        data: &CreateCourseDTO,
    ) -> Result<Course, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO courses (title, description, teacher_id, created_at, updated_at, is_active) \
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(teacher_id)
        .bind(now)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Course {
            course_id: result.last_insert_rowid(),
            title: data.title.clone(),
            description: data.description.clone(),
            teacher_id,
            created_at: now,
            updated_at: now,
            is_active: true,
        })
    }

    /// Corsi attivi, dal più recentemente aggiornato
    pub async fn list_active(&self) -> Result<Vec<CourseDTO>, Error> {
        let query = format!(
            "{COURSE_DTO_SELECT} WHERE c.is_active = 1 ORDER BY c.updated_at DESC, c.course_id DESC"
        );
        let courses = sqlx::query_as::<_, CourseDTO>(&query)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(courses)
    }

    /// Dettaglio corso con nome docente risolto
    pub async fn detail(&self, course_id: i64) -> Result<Option<CourseDTO>, Error> {
        let query = format!("{COURSE_DTO_SELECT} WHERE c.course_id = ?");
        let course = sqlx::query_as::<_, CourseDTO>(&query)
            .bind(course_id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(course)
    }

    /// Ricerca per titolo: i corsi inattivi compaiono solo per il loro docente
    pub async fn search(&self, pattern: &str, viewer_id: i64) -> Result<Vec<CourseDTO>, Error> {
        let like = format!("%{}%", pattern);
        let query = format!(
            "{COURSE_DTO_SELECT} WHERE c.title LIKE ? AND (c.is_active = 1 OR c.teacher_id = ?) \
             ORDER BY c.updated_at DESC, c.course_id DESC"
        );
        let courses = sqlx::query_as::<_, CourseDTO>(&query)
            .bind(like)
            .bind(viewer_id)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(courses)
    }

    /// Corsi tenuti da un docente, prima gli attivi
    pub async fn list_by_teacher(&self, teacher_id: i64) -> Result<Vec<Course>, Error> {
        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE teacher_id = ? \
             ORDER BY is_active DESC, course_id DESC"
        );
        let courses = sqlx::query_as::<_, Course>(&query)
            .bind(teacher_id)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(courses)
    }

    /// Inverte il flag di attivazione e ritorna il nuovo stato
    pub async fn toggle_activation(&self, course_id: i64) -> Result<bool, Error> {
        sqlx::query(
            "UPDATE courses SET is_active = 1 - is_active, updated_at = ? WHERE course_id = ?",
        )
        .bind(Utc::now())
        .bind(course_id)
        .execute(&self.connection_pool)
        .await?;

        let is_active: bool =
            sqlx::query_scalar("SELECT is_active FROM courses WHERE course_id = ?")
                .bind(course_id)
                .fetch_one(&self.connection_pool)
                .await?;

        Ok(is_active)
    }
}

impl Read<Course, i64> for CourseRepository {
    async fn read(&self, id: &i64) -> Result<Option<Course>, Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = ?");
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(course)
    }
}

impl Update<Course, UpdateCourseDTO, i64> for CourseRepository {
    async fn update(&self, id: &i64, data: &UpdateCourseDTO) -> Result<Course, Error> {
        // COALESCE mantiene il valore corrente per i campi non forniti
        sqlx::query(
            "UPDATE courses SET title = COALESCE(?, title), \
             description = COALESCE(?, description), updated_at = ? WHERE course_id = ?",
        )
        .bind(data.title.as_deref())
        .bind(data.description.as_deref())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for CourseRepository {
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM courses WHERE course_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}
