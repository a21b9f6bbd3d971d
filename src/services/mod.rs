//! Business logic services
//!
//! Services sit between the HTTP layer and the repositories: they validate
//! input, enforce ownership, and compose repository calls. Each rich service
//! carries its own error enum; thin ones return `anyhow::Result` directly.

pub mod content;
pub mod course;
pub mod module;
pub mod password;
pub mod subject;
pub mod user;

pub use content::{ContentService, ContentServiceError};
pub use course::{generate_slug, CourseService, CourseServiceError};
pub use module::{FormsetError, ModuleService, ModuleServiceError};
pub use subject::SubjectService;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
