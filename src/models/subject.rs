//! Subject model

use serde::{Deserialize, Serialize};

/// Subject entity.
///
/// Subjects are a static reference taxonomy for courses; a default subject
/// is seeded by the migrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier
    pub id: i64,
    /// Subject title
    pub title: String,
    /// URL-friendly slug (unique)
    pub slug: String,
}
