//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Upload and enrollment timestamps are stored as RFC 3339 strings; session
//! timestamps as unix seconds so expiry can be compared numerically.

use chrono::{DateTime, SecondsFormat, Utc};
use coursehub_core::{
  course::Course,
  resource::Resource,
  user::{Identity, Role, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_unix(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> String { role.as_ref().to_owned() }

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::UnknownRole(s.to_owned()))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Wrap `needle` in `%…%`, escaping LIKE wildcards with `\`.
pub fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Column list matching [`course_from_row`].
pub const COURSE_COLUMNS: &str =
  "c.id, c.name, c.description, c.instructor, c.credits, c.semester";

pub fn course_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
  Ok(Course {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    instructor:  row.get(3)?,
    credits:     row.get(4)?,
    semester:    row.get(5)?,
  })
}

/// A user row as read from SQLite, before the role is decoded.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub role:          String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      id:       self.id,
      username: self.username,
      role:     decode_role(&self.role)?,
    })
  }
}

/// A resource row as read from SQLite, before the timestamp is decoded.
pub struct RawResource {
  pub id:          i64,
  pub course_id:   i64,
  pub name:        String,
  pub link:        String,
  pub upload_date: String,
}

impl RawResource {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      course_id:   row.get(1)?,
      name:        row.get(2)?,
      link:        row.get(3)?,
      upload_date: row.get(4)?,
    })
  }

  pub fn into_resource(self) -> Result<Resource> {
    Ok(Resource {
      id:          self.id,
      course_id:   self.course_id,
      name:        self.name,
      link:        self.link,
      upload_date: decode_dt(&self.upload_date)?,
    })
  }
}
