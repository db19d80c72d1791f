//! Server-side session records.

use chrono::{DateTime, Utc};

/// A login session. Only the SHA-256 digest of the client's token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub token_hash: String,
  pub user_id:    i64,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
