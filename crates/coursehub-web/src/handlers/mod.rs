pub mod account;
pub mod admin;
pub mod resources;
pub mod student;

use coursehub_core::{Error as CoreError, user::Role};

/// Where a user of `role` lands after login and on "back to dashboard".
pub(crate) fn dashboard_for(role: Role) -> &'static str {
  match role {
    Role::Student => "/student_dashboard",
    Role::Admin => "/admin_dashboard",
  }
}

/// Parse an optional whole-number form or query field; blank means absent.
pub(crate) fn parse_int(label: &str, raw: Option<&str>) -> Result<Option<i64>, CoreError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(None),
    Some(s) => s
      .parse()
      .map(Some)
      .map_err(|_| CoreError::Validation(format!("{label} must be a whole number"))),
  }
}
