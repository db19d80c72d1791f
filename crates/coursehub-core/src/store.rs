//! The `PortalStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `coursehub-store-sqlite`). The service layer depends on this abstraction,
//! not on any concrete backend.
//!
//! Absence of a referenced record is reported through `Option` or `bool`
//! return values so the service can map it to a domain error; `Self::Error`
//! is reserved for genuine storage failures.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  course::{Course, CourseFields, CourseQuery, CourseStats},
  enrollment::{CourseRemoval, EnrollStatus},
  resource::{NewResource, Resource},
  session::Session,
  user::{Identity, NewUser, User},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a coursehub storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Each call acquires
/// and releases whatever connection or transaction it needs within its own
/// scope.
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Insert a user. Returns `None` if the username is already taken; the
  /// check and insert happen as one atomic statement.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn open_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve an unexpired session to the identity it belongs to.
  fn session_identity<'a>(
    &'a self,
    token_hash: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;

  /// Remove a session. Removing an unknown session is not an error.
  fn close_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every session that expired at or before `now`; returns how many.
  fn purge_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  fn add_course(
    &self,
    fields: CourseFields,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// All courses, ordered by id.
  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Courses matching every present filter of `query`, ordered by id.
  fn search_courses<'a>(
    &'a self,
    query: &'a CourseQuery,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + 'a;

  /// Replace all mutable fields. Returns `None` if the course does not exist.
  fn update_course(
    &self,
    id: i64,
    fields: CourseFields,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// Delete the course's enrollments, then its resources, then the course,
  /// in a single transaction. Returns `None` (and changes nothing) if the
  /// course does not exist.
  fn delete_course(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CourseRemoval>, Self::Error>> + Send + '_;

  /// Insert a resource with a store-assigned upload timestamp. Returns
  /// `None` if the course does not exist.
  fn add_resource(
    &self,
    input: NewResource,
  ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send + '_;

  /// Resources of a course, ordered by id.
  fn list_resources(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<Vec<Resource>, Self::Error>> + Send + '_;

  /// Returns whether a row was deleted.
  fn delete_resource(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Enrollment ledger ─────────────────────────────────────────────────

  /// Insert the enrollment if absent, as one atomic step. Returns `None` if
  /// the course does not exist.
  fn enroll(
    &self,
    student_id: i64,
    course_id: i64,
  ) -> impl Future<Output = Result<Option<EnrollStatus>, Self::Error>> + Send + '_;

  /// Returns whether a row was deleted.
  fn unenroll(
    &self,
    student_id: i64,
    course_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Courses the student is enrolled in, ordered by course id.
  fn list_enrolled(
    &self,
    student_id: i64,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Enrollment head-counts for every course, ordered by course id.
  fn enrollment_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<CourseStats>, Self::Error>> + Send + '_;
}
