//! Course resource links.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`/`POST` | `/admin/upload_resource/{course_id}` | Form: `resource_name`, `resource_link` |
//! | `POST` | `/admin/delete_resource/{resource_id}/{course_id}` | No-op if absent |
//! | `GET`  | `/resources/{course_id}` | Any signed-in user |

use axum::{
  Form,
  extract::{Path, State},
  response::Response,
};
use axum_extra::extract::CookieJar;
use coursehub_core::{
  policy::{self, Action},
  service::{CourseResources, Service},
  store::PortalStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::CurrentUser,
  error::{Failure, ResultExt as _},
  flash::{self, Flash},
  handlers::dashboard_for,
};

fn upload_path(course_id: i64) -> String { format!("/admin/upload_resource/{course_id}") }

/// `GET /admin/upload_resource/{course_id}`
pub async fn upload_page<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  jar: CookieJar,
  Path(course_id): Path<i64>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  policy::require(&actor, Action::ManageResources).back_to("/admin_dashboard")?;
  let view = Service::new(&*state.store)
    .course_resources(&actor, course_id)
    .await
    .back_to("/admin_dashboard")?;
  Ok(flash::page(jar, view))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceForm {
  #[serde(default)]
  pub resource_name: String,
  #[serde(default)]
  pub resource_link: String,
}

/// `POST /admin/upload_resource/{course_id}`
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(course_id): Path<i64>,
  Form(form): Form<ResourceForm>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let back = upload_path(course_id);
  Service::new(&*state.store)
    .add_resource(&actor, course_id, &form.resource_name, &form.resource_link)
    .await
    .back_to(back.as_str())?;
  Ok(flash::redirect(&back, Flash::success("Resource link added successfully!")))
}

/// `POST /admin/delete_resource/{resource_id}/{course_id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path((resource_id, course_id)): Path<(i64, i64)>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let back = upload_path(course_id);
  Service::new(&*state.store)
    .delete_resource(&actor, resource_id)
    .await
    .back_to(back.as_str())?;
  Ok(flash::redirect(&back, Flash::success("Resource deleted successfully!")))
}

#[derive(Debug, Serialize)]
struct ResourcesPage {
  #[serde(flatten)]
  view:              CourseResources,
  back_to_dashboard: &'static str,
}

/// `GET /resources/{course_id}`
pub async fn view<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  jar: CookieJar,
  Path(course_id): Path<i64>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let back_to_dashboard = dashboard_for(actor.role);
  let view = Service::new(&*state.store)
    .course_resources(&actor, course_id)
    .await
    .back_to(back_to_dashboard)?;
  Ok(flash::page(jar, ResourcesPage { view, back_to_dashboard }))
}
