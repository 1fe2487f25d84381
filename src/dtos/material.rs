//! Material DTOs - Data Transfer Objects per i materiali didattici

use crate::entities::CourseMaterial;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MaterialDTO {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<CourseMaterial> for MaterialDTO {
    fn from(value: CourseMaterial) -> Self {
        Self {
            id: value.material_id,
            course_id: value.course_id,
            url: format!("/uploads/{}", value.file_path),
            title: value.title,
            uploaded_at: value.uploaded_at,
        }
    }
}
