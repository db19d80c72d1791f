//! The enrollment ledger: (student, course) association records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student's enrollment in a course. At most one exists per pair
/// (enforced by the primary key in the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
  pub student_id:  i64,
  pub course_id:   i64,
  pub enrolled_at: DateTime<Utc>,
}

/// Result of an enroll attempt. A repeated enrollment is a distinct, benign
/// outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrollStatus {
  Enrolled(Enrollment),
  AlreadyEnrolled,
}

/// What a cascading course deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseRemoval {
  pub course_id:           i64,
  pub enrollments_removed: usize,
  pub resources_removed:   usize,
}
