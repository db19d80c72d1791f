//! Home, registration, login and logout.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Current identity, if any |
//! | `GET`/`POST` | `/register` | Form: `username`, `password`, `role` |
//! | `GET`/`POST` | `/login` | Form: `username`, `password` |
//! | `GET`/`POST` | `/logout` | Requires a session |

use axum::{
  Form,
  extract::State,
  response::{IntoResponse as _, Response},
};
use axum_extra::extract::CookieJar;
use coursehub_core::{
  service::Service,
  store::PortalStore,
  user::{Identity, Registration},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  AppState,
  auth::{self, Argon2Passwords, CurrentUser, MaybeUser},
  error::{Failure, ResultExt as _},
  flash::{self, Flash},
  handlers::dashboard_for,
};

#[derive(Debug, Serialize)]
struct Home {
  user: Option<Identity>,
}

/// `GET /`
pub async fn home<S>(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  flash::page(jar, Home { user })
}

/// `GET /register` and `GET /login`. The form pages carry only the notice.
pub async fn form_page(jar: CookieJar) -> Response { flash::page(jar, json!({})) }

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<Registration>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  Service::new(&*state.store)
    .register(&Argon2Passwords, form)
    .await
    .back_to("/register")?;

  Ok(flash::redirect(
    "/login",
    Flash::success("Registration successful! Please log in."),
  ))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /login`
///
/// On success sets the session cookie and redirects to the role's dashboard.
/// A failed attempt sets no cookie.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Form(form): Form<LoginForm>,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let identity = Service::new(&*state.store)
    .login(&Argon2Passwords, &form.username, &form.password)
    .await
    .back_to("/login")?;

  let jar = auth::start_session(&state, &identity, jar).await.back_to("/login")?;
  let redirect = flash::redirect(
    dashboard_for(identity.role),
    Flash::success(format!("Welcome, {}!", identity.username)),
  );
  Ok((jar, redirect).into_response())
}

/// `GET|POST /logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  CurrentUser(identity): CurrentUser,
  jar: CookieJar,
) -> Result<Response, Failure>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let jar = auth::end_session(&state, jar).await.back_to("/")?;
  tracing::info!(user_id = identity.id, "logged out");

  let redirect = flash::redirect("/", Flash::success("You have been logged out."));
  Ok((jar, redirect).into_response())
}
