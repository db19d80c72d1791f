//! HTTP surface for the course portal.
//!
//! Exposes an axum [`Router`] over any [`PortalStore`]. GET pages answer with
//! a JSON view context; form posts answer with a `303` redirect and a notice.

pub mod auth;
pub mod cookies;
pub mod error;
pub mod flash;
pub mod handlers;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  middleware,
  routing::{get, post},
};
use coursehub_core::store::PortalStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{account, admin, resources, student};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `COURSEHUB_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub database_path:     PathBuf,
  pub session_ttl_hours: i64,
  pub secure_cookies:    bool,
}

impl ServerConfig {
  /// The configured session lifetime, or `None` if it is not a positive
  /// number of hours that fits a [`chrono::Duration`].
  pub fn session_ttl(&self) -> Option<chrono::Duration> {
    chrono::Duration::try_hours(self.session_ttl_hours).filter(|ttl| *ttl > chrono::Duration::zero())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PortalStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the portal's axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/",                                 get(account::home::<S>))
    .route("/register",                         get(account::form_page).post(account::register::<S>))
    .route("/login",                            get(account::form_page).post(account::login::<S>))
    .route("/logout",                           get(account::logout::<S>).post(account::logout::<S>))
    .route("/student_dashboard",                get(student::dashboard::<S>))
    .route("/api/search_courses",               get(student::search::<S>))
    .route("/enroll/{course_id}",               post(student::enroll::<S>))
    .route("/unenroll/{course_id}",             post(student::unenroll::<S>))
    .route("/admin_dashboard",                  get(admin::dashboard::<S>))
    .route("/admin/add_course",                 get(admin::add_page::<S>).post(admin::add::<S>))
    .route("/admin/edit_course/{course_id}",    get(admin::edit_page::<S>).post(admin::edit::<S>))
    .route("/admin/delete_course/{course_id}",  post(admin::delete::<S>))
    .route(
      "/admin/upload_resource/{course_id}",
      get(resources::upload_page::<S>).post(resources::upload::<S>),
    )
    .route(
      "/admin/delete_resource/{resource_id}/{course_id}",
      post(resources::delete::<S>),
    )
    .route("/resources/{course_id}",            get(resources::view::<S>))
    .layer(middleware::from_fn_with_state(state.clone(), flash::deliver::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
