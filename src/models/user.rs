//! User model
//!
//! This module defines the User entity, roles, and the declarative
//! role-to-permission mapping used by the management routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
///
/// Instructors own courses and everything reachable from them; students
/// hold no management permissions and only use the public routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: the password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user holds the given permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Capability flags for course management operations.
///
/// These mirror the four declarative permission checks on the management
/// routes: one per operation, checked by per-route middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// May list own courses on the management screen
    ViewCourse,
    /// May create courses
    AddCourse,
    /// May edit own courses
    ChangeCourse,
    /// May delete own courses
    DeleteCourse,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::ViewCourse => "view_course",
            Permission::AddCourse => "add_course",
            Permission::ChangeCourse => "change_course",
            Permission::DeleteCourse => "delete_course",
        };
        write!(f, "{}", name)
    }
}

/// User role for authorization.
///
/// Roles determine what a user can manage:
/// - Admin: full access
/// - Instructor: full course management over own courses
/// - Student: public routes only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Instructor - manages own courses
    Instructor,
    /// Student - no management permissions
    Student,
}

impl UserRole {
    /// Declarative role -> permission mapping.
    ///
    /// Admins and instructors hold all four course permissions; ownership
    /// scoping on top of this is enforced by the repositories.
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin | UserRole::Instructor => matches!(
                permission,
                Permission::ViewCourse
                    | Permission::AddCourse
                    | Permission::ChangeCourse
                    | Permission::DeleteCourse
            ),
            UserRole::Student => false,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Student
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Instructor => write!(f, "instructor"),
            UserRole::Student => write!(f, "student"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "instructor" => Ok(UserRole::Instructor),
            "student" => Ok(UserRole::Student),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}
