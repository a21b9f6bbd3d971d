//! Data models
//!
//! This module contains all data structures used throughout the Coursely
//! service. Models represent:
//! - Database entities (User, Session, Subject, Course, Module, Content, items)
//! - Input types for create/update operations
//! - The polymorphic content item sum type and its per-kind form schema

mod content;
mod course;
mod module;
mod session;
mod subject;
mod user;

pub use content::{
    form_fields, Content, ContentForm, ContentItem, ContentKind, ContentWithItem, FieldSpec,
    FieldType, FileItem, ImageItem, TextItem, VideoItem,
};
pub use course::{Course, CourseWithModules, CreateCourseInput, UpdateCourseInput};
pub use module::{Module, ModuleForm, ModuleFormset};
pub use session::Session;
pub use subject::Subject;
pub use user::{Permission, User, UserRole};
