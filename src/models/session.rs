//! Session model
//!
//! A session is an opaque bearer token bound to one account. Tokens are
//! random UUIDs handed out at login, carried back either as a `Bearer`
//! header or a `session` cookie, and they expire after a configurable
//! number of days (`auth.session_days`). Expired rows are dropped lazily
//! on validation and swept periodically.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated session: one token, one account, a fixed lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The token itself (UUID v4, primary key)
    pub id: String,
    /// Account this session authenticates
    pub user_id: i64,
    /// Moment the token stops being valid
    pub expires_at: DateTime<Utc>,
    /// Moment the token was issued
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session for a user, valid for `lifetime_days` from now
    pub fn issue(user_id: i64, lifetime_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(lifetime_days),
            created_at: now,
        }
    }

    /// Whether the token's lifetime has elapsed
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
