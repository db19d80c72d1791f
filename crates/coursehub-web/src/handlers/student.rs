//! Student dashboard, course search and enrollment.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/student_dashboard` | Optional `?search=` over name/description |
//! | `GET`  | `/api/search_courses` | JSON; `query`, `instructor`, `semester`, `min_credits`, `max_credits` |
//! | `POST` | `/enroll/{course_id}` | Repeat enrollments report a warning |
//! | `POST` | `/unenroll/{course_id}` | Idempotent |

use axum::{
  Json,
  extract::{Path, Query, State},
  response::Response,
};
use axum_extra::extract::CookieJar;
use coursehub_core::{
  course::{Course, CourseQuery},
  enrollment::EnrollStatus,
  service::Service,
  store::PortalStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, Failure, ResultExt as _},
  flash::{self, Flash},
  handlers::parse_int,
};

const DASHBOARD: &str = "/student_dashboard";

// ─── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
  pub search: Option<String>,
}

/// `GET /student_dashboard[?search=...]`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  jar: CookieJar,
  Query(params): Query<DashboardParams>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let view = Service::new(&*state.store)
    .student_dashboard(&actor, params.search)
    .await
    .back_to("/")?;
  Ok(flash::page(jar, view))
}

// ─── Search API ───────────────────────────────────────────────────────────────

/// Raw query parameters; numeric fields arrive as text so that blank values
/// can be treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub query:       Option<String>,
  pub instructor:  Option<String>,
  pub semester:    Option<String>,
  pub min_credits: Option<String>,
  pub max_credits: Option<String>,
}

impl SearchParams {
  fn into_query(self) -> coursehub_core::Result<CourseQuery> {
    Ok(CourseQuery {
      min_credits: parse_int("min_credits", self.min_credits.as_deref())?,
      max_credits: parse_int("max_credits", self.max_credits.as_deref())?,
      text:        self.query,
      instructor:  self.instructor,
      semester:    self.semester,
    })
  }
}

/// `GET /api/search_courses`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let query = params.into_query()?;
  let courses = Service::new(&*state.store)
    .search_courses(&actor, query)
    .await?;
  Ok(Json(courses))
}

// ─── Enrollment ───────────────────────────────────────────────────────────────

/// `POST /enroll/{course_id}`
pub async fn enroll<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(course_id): Path<i64>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let status = Service::new(&*state.store)
    .enroll(&actor, course_id)
    .await
    .back_to(DASHBOARD)?;

  let notice = match status {
    EnrollStatus::Enrolled(_) => Flash::success("Successfully enrolled in the course!"),
    EnrollStatus::AlreadyEnrolled => Flash::warning("You are already enrolled in this course."),
  };
  Ok(flash::redirect(DASHBOARD, notice))
}

/// `POST /unenroll/{course_id}`
pub async fn unenroll<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(course_id): Path<i64>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  Service::new(&*state.store)
    .unenroll(&actor, course_id)
    .await
    .back_to(DASHBOARD)?;

  Ok(flash::redirect(
    DASHBOARD,
    Flash::success("Successfully unenrolled from the course."),
  ))
}
