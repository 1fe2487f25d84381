//! Entities module - Entità persistite su database
//!
//! Ogni entità rispecchia una tabella dello schema. Le conversioni verso
//! la rappresentazione esterna vivono nei DTO.

pub mod course;
pub mod enums;
pub mod message;
pub mod notification;
pub mod user;

// Re-exports per facilitare l'import
pub use course::{Course, CourseMaterial, Enrollment, Feedback};
pub use enums::{MessageType, UserRole};
pub use message::{ChatMessage, FileUpload};
pub use notification::Notification;
pub use user::User;
