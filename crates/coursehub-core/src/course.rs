//! Course records and the catalog search query.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A course in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub id:          i64,
  pub name:        String,
  pub description: String,
  pub instructor:  String,
  pub credits:     i64,
  pub semester:    String,
}

/// The mutable fields of a course, used for both creation and full-replace
/// updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFields {
  pub name:        String,
  pub description: String,
  pub instructor:  String,
  pub credits:     i64,
  pub semester:    String,
}

impl CourseFields {
  /// Trim text fields and reject blank required values or negative credits.
  pub fn validate(self) -> Result<Self> {
    let fields = Self {
      name:        self.name.trim().to_owned(),
      description: self.description.trim().to_owned(),
      instructor:  self.instructor.trim().to_owned(),
      credits:     self.credits,
      semester:    self.semester.trim().to_owned(),
    };

    for (label, value) in [
      ("name", &fields.name),
      ("instructor", &fields.instructor),
      ("semester", &fields.semester),
    ] {
      if value.is_empty() {
        return Err(Error::validation(format!("course {label} is required")));
      }
    }
    if fields.credits < 0 {
      return Err(Error::validation("credits cannot be negative"));
    }
    Ok(fields)
  }
}

/// Parameters for [`PortalStore::search_courses`](crate::store::PortalStore::search_courses).
///
/// Every filter is optional; present filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseQuery {
  /// Case-insensitive substring over name OR description.
  pub text:        Option<String>,
  /// Case-insensitive substring over the instructor.
  pub instructor:  Option<String>,
  /// Exact semester match.
  pub semester:    Option<String>,
  /// Inclusive lower bound on credits.
  pub min_credits: Option<i64>,
  /// Inclusive upper bound on credits.
  pub max_credits: Option<i64>,
}

impl CourseQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), ..Self::default() }
  }

  /// Trim string filters and treat blank ones as absent.
  pub fn normalized(self) -> Self {
    fn clean(v: Option<String>) -> Option<String> {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    }
    Self {
      text:        clean(self.text),
      instructor:  clean(self.instructor),
      semester:    clean(self.semester),
      min_credits: self.min_credits,
      max_credits: self.max_credits,
    }
  }
}

/// Per-course enrollment head-count shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStats {
  pub course_id:     i64,
  pub name:          String,
  pub student_count: i64,
}
