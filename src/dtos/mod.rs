//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod course;
pub mod enrollment;
pub mod feedback;
pub mod material;
pub mod message;
pub mod notification;
pub mod query;
pub mod user;
pub mod ws_event;

// Re-exports per mantenere gli import compatti nei service
pub use course::{CourseDTO, CourseRefDTO, CreateCourseDTO, UpdateCourseDTO};
pub use enrollment::{BulkRemoveDTO, EnrollmentDTO};
pub use feedback::{CreateFeedbackDTO, FeedbackDTO};
pub use material::MaterialDTO;
pub use message::{
    ChatFileDTO, ChatSessionDTO, MarkReadDTO, MessageDTO, ReadStatusDTO, SendMessageDTO, UnreadDTO,
};
pub use notification::NotificationDTO;
pub use query::{SearchQuery, WsAuthQuery};
pub use user::{
    AuthResponseDTO, DashboardDTO, LoginDTO, RegisterDTO, UpdateStatusDTO, UserDTO, UserDetailDTO,
};
pub use ws_event::{ClientEventDTO, WsEventDTO};
