//! Instructor-uploaded resource links attached to a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
  pub id:          i64,
  pub course_id:   i64,
  pub name:        String,
  pub link:        String,
  /// Assigned by the store at insertion.
  pub upload_date: DateTime<Utc>,
}

/// Input to [`PortalStore::add_resource`](crate::store::PortalStore::add_resource).
#[derive(Debug, Clone)]
pub struct NewResource {
  pub course_id: i64,
  pub name:      String,
  pub link:      String,
}

impl NewResource {
  /// Build a resource, requiring a name and an absolute `http(s)` link.
  pub fn new(course_id: i64, name: &str, link: &str) -> Result<Self> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::validation("resource name is required"));
    }

    let link = link.trim();
    let parsed = Url::parse(link)
      .map_err(|e| Error::validation(format!("invalid resource link: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(Error::validation("resource link must use http or https"));
    }

    Ok(Self {
      course_id,
      name: name.to_owned(),
      link: link.to_owned(),
    })
  }
}
