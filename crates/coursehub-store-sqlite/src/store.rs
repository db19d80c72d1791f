//! [`SqliteStore`], the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, functions::FunctionFlags, types::Value};

use coursehub_core::{
  course::{Course, CourseFields, CourseQuery, CourseStats},
  enrollment::{CourseRemoval, EnrollStatus, Enrollment},
  resource::{NewResource, Resource},
  session::Session,
  store::PortalStore,
  user::{Identity, NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    COURSE_COLUMNS, RawResource, RawUser, course_from_row, decode_dt, encode_dt,
    encode_role, encode_unix, like_pattern,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A coursehub store backed by a single SQLite file.
///
/// Cloning shares the inner reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.create_scalar_function(
          "lower_utf8",
          1,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a course SELECT with positional parameters.
  async fn query_courses(&self, sql: String, params: Vec<Value>) -> Result<Vec<Course>> {
    let courses = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), course_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(courses)
  }
}

fn course_exists(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM courses WHERE id = ?1", rusqlite::params![id], |_| {
        Ok(())
      })
      .optional()?
      .is_some(),
  )
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let username = input.username.clone();
    let hash     = input.password_hash.clone();
    let role_str = encode_role(input.role);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)
           ON CONFLICT (username) DO NOTHING",
          rusqlite::params![username, hash, role_str],
        )?;
        Ok((inserted == 1).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| User {
      id,
      username:      input.username,
      password_hash: input.password_hash,
      role:          input.role,
    }))
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
              rusqlite::params![username],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn open_session(&self, session: Session) -> Result<()> {
    let created = encode_unix(session.created_at);
    let expires = encode_unix(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session.token_hash, session.user_id, created, expires],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_identity(
    &self,
    token_hash: &str,
    now:        DateTime<Utc>,
  ) -> Result<Option<Identity>> {
    let token_hash = token_hash.to_owned();
    let now        = encode_unix(now);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT u.id, u.username, u.password_hash, u.role
               FROM sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = ?1 AND s.expires_at > ?2",
              rusqlite::params![token_hash, now],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_identity).transpose()
  }

  async fn close_session(&self, token_hash: &str) -> Result<()> {
    let token_hash = token_hash.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn purge_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
    let now = encode_unix(now);
    let purged = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now],
        )?)
      })
      .await?;
    Ok(purged)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn add_course(&self, fields: CourseFields) -> Result<Course> {
    let f = fields.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (name, description, instructor, credits, semester)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![f.name, f.description, f.instructor, f.credits, f.semester],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Course {
      id,
      name:        fields.name,
      description: fields.description,
      instructor:  fields.instructor,
      credits:     fields.credits,
      semester:    fields.semester,
    })
  }

  async fn get_course(&self, id: i64) -> Result<Option<Course>> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = ?1");
    let course = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![id], course_from_row).optional()?)
      })
      .await?;
    Ok(course)
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    self
      .query_courses(format!("SELECT {COURSE_COLUMNS} FROM courses c ORDER BY c.id"), vec![])
      .await
  }

  async fn search_courses(&self, query: &CourseQuery) -> Result<Vec<Course>> {
    // Both sides are folded with `lower_utf8` so matching ignores case
    // beyond ASCII.
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<Value> = vec![];

    if let Some(text) = &query.text {
      params.push(Value::Text(like_pattern(&text.to_lowercase())));
      let n = params.len();
      conds.push(format!(
        "(lower_utf8(c.name) LIKE ?{n} ESCAPE '\\' \
         OR lower_utf8(c.description) LIKE ?{n} ESCAPE '\\')"
      ));
    }
    if let Some(instructor) = &query.instructor {
      params.push(Value::Text(like_pattern(&instructor.to_lowercase())));
      conds.push(format!(
        "lower_utf8(c.instructor) LIKE ?{} ESCAPE '\\'",
        params.len()
      ));
    }
    if let Some(semester) = &query.semester {
      params.push(Value::Text(semester.clone()));
      conds.push(format!("c.semester = ?{}", params.len()));
    }
    if let Some(min) = query.min_credits {
      params.push(Value::Integer(min));
      conds.push(format!("c.credits >= ?{}", params.len()));
    }
    if let Some(max) = query.max_credits {
      params.push(Value::Integer(max));
      conds.push(format!("c.credits <= ?{}", params.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    self
      .query_courses(
        format!("SELECT {COURSE_COLUMNS} FROM courses c {where_clause} ORDER BY c.id"),
        params,
      )
      .await
  }

  async fn update_course(&self, id: i64, fields: CourseFields) -> Result<Option<Course>> {
    let f = fields.clone();
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE courses
           SET name = ?1, description = ?2, instructor = ?3, credits = ?4, semester = ?5
           WHERE id = ?6",
          rusqlite::params![f.name, f.description, f.instructor, f.credits, f.semester, id],
        )?)
      })
      .await?;

    Ok((updated == 1).then(|| Course {
      id,
      name:        fields.name,
      description: fields.description,
      instructor:  fields.instructor,
      credits:     fields.credits,
      semester:    fields.semester,
    }))
  }

  async fn delete_course(&self, id: i64) -> Result<Option<CourseRemoval>> {
    let removal = self
      .conn
      .call(move |conn| {
        // Dropping the transaction without commit rolls back.
        let tx = conn.transaction()?;
        if !course_exists(&tx, id)? {
          return Ok(None);
        }

        let enrollments_removed = tx.execute(
          "DELETE FROM enrollments WHERE course_id = ?1",
          rusqlite::params![id],
        )?;
        let resources_removed = tx.execute(
          "DELETE FROM resources WHERE course_id = ?1",
          rusqlite::params![id],
        )?;
        tx.execute("DELETE FROM courses WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;

        Ok(Some(CourseRemoval { course_id: id, enrollments_removed, resources_removed }))
      })
      .await?;
    Ok(removal)
  }

  async fn add_resource(&self, input: NewResource) -> Result<Option<Resource>> {
    let upload_date = Utc::now();
    let at_str      = encode_dt(upload_date);
    let course_id   = input.course_id;
    let name        = input.name.clone();
    let link        = input.link.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !course_exists(&tx, course_id)? {
          return Ok(None);
        }
        tx.execute(
          "INSERT INTO resources (course_id, name, link, upload_date) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![course_id, name, link, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    // Round-trip through the stored text so callers see the persisted precision.
    let upload_date = decode_dt(&encode_dt(upload_date))?;
    Ok(id.map(|id| Resource {
      id,
      course_id,
      name: input.name,
      link: input.link,
      upload_date,
    }))
  }

  async fn list_resources(&self, course_id: i64) -> Result<Vec<Resource>> {
    let raws: Vec<RawResource> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, course_id, name, link, upload_date
           FROM resources WHERE course_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![course_id], RawResource::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResource::into_resource).collect()
  }

  async fn delete_resource(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM resources WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Enrollment ledger ─────────────────────────────────────────────────────

  async fn enroll(&self, student_id: i64, course_id: i64) -> Result<Option<EnrollStatus>> {
    let enrolled_at = decode_dt(&encode_dt(Utc::now()))?;
    let at_str      = encode_dt(enrolled_at);

    let inserted: Option<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !course_exists(&tx, course_id)? {
          return Ok(None);
        }
        // The primary key arbitrates concurrent submissions; no read-check.
        let n = tx.execute(
          "INSERT INTO enrollments (student_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (student_id, course_id) DO NOTHING",
          rusqlite::params![student_id, course_id, at_str],
        )?;
        tx.commit()?;
        Ok(Some(n == 1))
      })
      .await?;

    Ok(inserted.map(|inserted| {
      if inserted {
        EnrollStatus::Enrolled(Enrollment { student_id, course_id, enrolled_at })
      } else {
        EnrollStatus::AlreadyEnrolled
      }
    }))
  }

  async fn unenroll(&self, student_id: i64, course_id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM enrollments WHERE student_id = ?1 AND course_id = ?2",
          rusqlite::params![student_id, course_id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn list_enrolled(&self, student_id: i64) -> Result<Vec<Course>> {
    self
      .query_courses(
        format!(
          "SELECT {COURSE_COLUMNS}
           FROM enrollments e
           JOIN courses c ON c.id = e.course_id
           WHERE e.student_id = ?1
           ORDER BY c.id"
        ),
        vec![Value::Integer(student_id)],
      )
      .await
  }

  async fn enrollment_counts(&self) -> Result<Vec<CourseStats>> {
    let stats = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.name, COUNT(e.student_id)
           FROM courses c
           LEFT JOIN enrollments e ON e.course_id = c.id
           GROUP BY c.id, c.name
           ORDER BY c.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CourseStats {
              course_id:     row.get(0)?,
              name:          row.get(1)?,
              student_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(stats)
  }
}
