//! Admin dashboard and course management.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin_dashboard` | Courses plus enrollment counts |
//! | `GET`/`POST` | `/admin/add_course` | Form: [`CourseForm`] |
//! | `GET`/`POST` | `/admin/edit_course/{id}` | Full replace |
//! | `POST` | `/admin/delete_course/{id}` | Cascades to enrollments and resources |

use axum::{
  Form,
  extract::{Path, State},
  response::Response,
};
use axum_extra::extract::CookieJar;
use coursehub_core::{
  Error as CoreError,
  course::{Course, CourseFields},
  policy::{self, Action},
  service::Service,
  store::PortalStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{Failure, ResultExt as _},
  flash::{self, Flash},
  handlers::parse_int,
};

const DASHBOARD: &str = "/admin_dashboard";

/// `GET /admin_dashboard`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  jar: CookieJar,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let view = Service::new(&*state.store)
    .admin_dashboard(&actor)
    .await
    .back_to("/")?;
  Ok(flash::page(jar, view))
}

// ─── Course form ──────────────────────────────────────────────────────────────

/// Submitted course fields. Every field must be present; `credits` must be a
/// whole number.
#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub instructor:  Option<String>,
  pub credits:     Option<String>,
  pub semester:    Option<String>,
}

impl CourseForm {
  fn into_fields(self) -> coursehub_core::Result<CourseFields> {
    let missing = || CoreError::Validation("all course fields are required".into());
    let credits = parse_int("credits", self.credits.as_deref())?.ok_or_else(missing)?;

    Ok(CourseFields {
      name:        self.name.ok_or_else(missing)?,
      description: self.description.ok_or_else(missing)?,
      instructor:  self.instructor.ok_or_else(missing)?,
      credits,
      semester:    self.semester.ok_or_else(missing)?,
    })
  }
}

// ─── Add ──────────────────────────────────────────────────────────────────────

/// `GET /admin/add_course`
pub async fn add_page<S>(
  CurrentUser(actor): CurrentUser,
  jar: CookieJar,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  policy::require(&actor, Action::ManageCourses).back_to(DASHBOARD)?;
  Ok(flash::page(jar, json!({})))
}

/// `POST /admin/add_course`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Form(form): Form<CourseForm>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  // Role check precedes form validation.
  policy::require(&actor, Action::ManageCourses).back_to(DASHBOARD)?;
  let fields = form.into_fields().back_to("/admin/add_course")?;

  Service::new(&*state.store)
    .add_course(&actor, fields)
    .await
    .back_to("/admin/add_course")?;
  Ok(flash::redirect(DASHBOARD, Flash::success("Course added successfully!")))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EditPage {
  course: Course,
}

/// `GET /admin/edit_course/{id}`
pub async fn edit_page<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  jar: CookieJar,
  Path(course_id): Path<i64>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let course = Service::new(&*state.store)
    .course(&actor, course_id)
    .await
    .back_to(DASHBOARD)?;
  Ok(flash::page(jar, EditPage { course }))
}

/// `POST /admin/edit_course/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(course_id): Path<i64>,
  Form(form): Form<CourseForm>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  policy::require(&actor, Action::ManageCourses).back_to(DASHBOARD)?;
  let back = format!("/admin/edit_course/{course_id}");
  let fields = form.into_fields().back_to(back.as_str())?;

  Service::new(&*state.store)
    .edit_course(&actor, course_id, fields)
    .await
    .map_err(|e| match e {
      CoreError::CourseNotFound(_) => Failure::new(e, DASHBOARD),
      other => Failure::new(other, back),
    })?;
  Ok(flash::redirect(DASHBOARD, Flash::success("Course updated successfully!")))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `POST /admin/delete_course/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(course_id): Path<i64>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  Service::new(&*state.store)
    .delete_course(&actor, course_id)
    .await
    .back_to(DASHBOARD)?;
  Ok(flash::redirect(DASHBOARD, Flash::success("Course deleted successfully!")))
}
