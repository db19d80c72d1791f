//! Role-based access policy.
//!
//! [`authorize`] is a pure decision over the caller's role; it never touches
//! storage. A [`Decision::Deny`] is terminal: callers must not mutate any
//! state after receiving one.

use serde::Serialize;
use strum::{Display, EnumIter};

use crate::{Error, Result, user::{Identity, Role}};

/// Every role-gated action in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
  ViewStudentDashboard,
  ViewAdminDashboard,
  ManageCourses,
  ManageResources,
  Enroll,
  Unenroll,
  ViewResources,
  SearchCourses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny,
}

impl Decision {
  pub fn is_allowed(self) -> bool { matches!(self, Self::Allow) }
}

/// Decide whether `role` may perform `action`.
pub fn authorize(role: Role, action: Action) -> Decision {
  use Action::*;

  let allowed = match action {
    ViewAdminDashboard | ManageCourses | ManageResources => role == Role::Admin,
    ViewStudentDashboard | Enroll | Unenroll => role == Role::Student,
    ViewResources | SearchCourses => true,
  };

  if allowed { Decision::Allow } else { Decision::Deny }
}

/// Like [`authorize`], but turns a denial into [`Error::Forbidden`].
pub fn require(actor: &Identity, action: Action) -> Result<()> {
  match authorize(actor.role, action) {
    Decision::Allow => Ok(()),
    Decision::Deny => {
      tracing::warn!(
        user_id = actor.id,
        role = %actor.role,
        %action,
        "access denied"
      );
      Err(Error::Forbidden { role: actor.role, action })
    }
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn manage_courses_is_admin_only() {
    assert_eq!(authorize(Role::Student, Action::ManageCourses), Decision::Deny);
    assert_eq!(authorize(Role::Admin, Action::ManageCourses), Decision::Allow);
  }

  #[test]
  fn enrollment_actions_are_student_only() {
    for action in [Action::Enroll, Action::Unenroll, Action::ViewStudentDashboard] {
      assert!(authorize(Role::Student, action).is_allowed(), "{action}");
      assert!(!authorize(Role::Admin, action).is_allowed(), "{action}");
    }
  }

  #[test]
  fn admin_actions_deny_students() {
    for action in [
      Action::ViewAdminDashboard,
      Action::ManageCourses,
      Action::ManageResources,
    ] {
      assert!(!authorize(Role::Student, action).is_allowed(), "{action}");
      assert!(authorize(Role::Admin, action).is_allowed(), "{action}");
    }
  }

  #[test]
  fn every_action_is_reachable_by_some_role() {
    for action in Action::iter() {
      let student = authorize(Role::Student, action).is_allowed();
      let admin = authorize(Role::Admin, action).is_allowed();
      assert!(student || admin, "{action} is unreachable for every role");
    }
  }

  #[test]
  fn require_reports_forbidden() {
    let actor = Identity { id: 7, username: "sam".into(), role: Role::Student };
    let err = require(&actor, Action::ManageResources).unwrap_err();
    assert!(matches!(
      err,
      Error::Forbidden { role: Role::Student, action: Action::ManageResources }
    ));
  }

  #[test]
  fn action_names_are_snake_case() {
    assert_eq!(Action::ViewAdminDashboard.to_string(), "view_admin_dashboard");
  }
}
