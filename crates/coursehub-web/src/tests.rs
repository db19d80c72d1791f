use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
  response::Response,
};
use coursehub_core::{
  course::{Course, CourseFields},
  resource::NewResource,
  store::PortalStore,
};
use coursehub_store_sqlite::SqliteStore;
use serde_json::Value;
use tower::ServiceExt as _;

use crate::{
  AppState, ServerConfig,
  auth::SESSION_COOKIE,
  flash::{FLASH_COOKIE, Flash, Level},
  router,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn config(secure_cookies: bool) -> ServerConfig {
  ServerConfig {
    host: "127.0.0.1".into(),
    port: 0,
    database_path: PathBuf::from(":memory:"),
    session_ttl_hours: 12,
    secure_cookies,
  }
}

async fn state_with(config: ServerConfig) -> AppState<SqliteStore> {
  AppState {
    store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    config: Arc::new(config),
  }
}

async fn make_state() -> AppState<SqliteStore> { state_with(config(false)).await }

/// Every full `Set-Cookie` line for `name`.
fn set_cookie_lines(resp: &Response, name: &str) -> Vec<String> {
  resp
    .headers()
    .get_all(header::SET_COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .filter(|c| c.starts_with(&format!("{name}=")))
    .map(str::to_owned)
    .collect()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
  app.clone().oneshot(req).await.unwrap()
}

fn get_req(uri: &str, session: Option<&str>) -> Request<Body> {
  let mut builder = Request::builder().method("GET").uri(uri);
  if let Some(token) = session {
    builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
  }
  builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, session: Option<&str>) -> Request<Body> {
  let mut builder = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
  if let Some(token) = session {
    builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
  }
  builder.body(Body::from(body.to_owned())).unwrap()
}

fn location(resp: &Response) -> &str {
  resp
    .headers()
    .get(header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
}

/// Value of the `Set-Cookie` for `name`, if the response sets one.
fn set_cookie(resp: &Response, name: &str) -> Option<String> {
  resp
    .headers()
    .get_all(header::SET_COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .filter_map(|c| c.split(';').next())
    .filter_map(|pair| pair.split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.to_owned())
}

fn notice(resp: &Response) -> Flash {
  let raw = set_cookie(resp, FLASH_COOKIE).expect("response carries a notice");
  Flash::decode(&raw).expect("notice decodes")
}

async fn json_body(resp: Response) -> Value {
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str, role: &str) -> Response {
  let body = format!("username={username}&password=hunter2&role={role}");
  send(app, post_form("/register", &body, None)).await
}

/// Register and log in, returning the session token.
async fn signed_in(app: &Router, username: &str, role: &str) -> String {
  register(app, username, role).await;
  let body = format!("username={username}&password=hunter2");
  let resp = send(app, post_form("/login", &body, None)).await;
  set_cookie(&resp, SESSION_COOKIE).expect("login sets a session cookie")
}

async fn course(state: &AppState<SqliteStore>, name: &str, instructor: &str) -> Course {
  state
    .store
    .add_course(CourseFields {
      name:        name.into(),
      description: format!("An introduction to {name}"),
      instructor:  instructor.into(),
      credits:     3,
      semester:    "Fall 2024".into(),
    })
    .await
    .unwrap()
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn protected_pages_redirect_to_login() {
  let app = router(make_state().await);

  for uri in ["/student_dashboard", "/admin_dashboard", "/resources/1"] {
    let resp = send(&app, get_req(uri, None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
    assert_eq!(location(&resp), "/login", "{uri}");
  }
}

#[tokio::test]
async fn register_then_login_lands_on_role_dashboard() {
  let app = router(make_state().await);

  let resp = register(&app, "alice", "student").await;
  assert_eq!(location(&resp), "/login");
  assert_eq!(notice(&resp).level, Level::Success);

  let resp = send(&app, post_form("/login", "username=alice&password=hunter2", None)).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/student_dashboard");
  assert_eq!(notice(&resp).message, "Welcome, alice!");
  let token = set_cookie(&resp, SESSION_COOKIE).unwrap();

  let resp = send(&app, get_req("/student_dashboard", Some(&token))).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let admin = signed_in(&app, "root", "admin").await;
  let resp = send(&app, get_req("/admin_dashboard", Some(&admin))).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_sets_no_session() {
  let app = router(make_state().await);
  register(&app, "alice", "student").await;

  let resp = send(&app, post_form("/login", "username=alice&password=nope", None)).await;
  assert_eq!(location(&resp), "/login");
  assert!(set_cookie(&resp, SESSION_COOKIE).is_none());
  assert_eq!(notice(&resp).message, "Invalid credentials.");
}

#[tokio::test]
async fn duplicate_username_returns_to_register() {
  let app = router(make_state().await);
  register(&app, "alice", "student").await;

  let resp = register(&app, "alice", "admin").await;
  assert_eq!(location(&resp), "/register");
  assert_eq!(notice(&resp).message, "That username is already taken.");
}

#[tokio::test]
async fn unknown_role_is_rejected() {
  let state = make_state().await;
  let app = router(state.clone());

  let resp = register(&app, "mallory", "superuser").await;
  assert_eq!(location(&resp), "/register");
  assert_eq!(notice(&resp).level, Level::Danger);
  assert!(state.store.find_user_by_username("mallory").await.unwrap().is_none());
}

#[tokio::test]
async fn logout_invalidates_the_session() {
  let app = router(make_state().await);
  let token = signed_in(&app, "alice", "student").await;

  let resp = send(&app, post_form("/logout", "", Some(&token))).await;
  assert_eq!(location(&resp), "/");
  assert_eq!(set_cookie(&resp, SESSION_COOKIE).as_deref(), Some(""));

  let resp = send(&app, get_req("/student_dashboard", Some(&token))).await;
  assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn quoted_session_cookie_is_accepted() {
  let app = router(make_state().await);
  let token = signed_in(&app, "alice", "student").await;

  let req = Request::builder()
    .uri("/student_dashboard")
    .header(header::COOKIE, format!("{SESSION_COOKIE}=\"{token}\""))
    .body(Body::empty())
    .unwrap();
  let resp = send(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn secure_flag_applies_to_session_and_notice_cookies() {
  let app = router(state_with(config(true)).await);
  register(&app, "alice", "student").await;

  let resp = send(&app, post_form("/login", "username=alice&password=hunter2", None)).await;
  let session = set_cookie_lines(&resp, SESSION_COOKIE);
  let notice = set_cookie_lines(&resp, FLASH_COOKIE);
  assert_eq!(session.len(), 1);
  assert_eq!(notice.len(), 1);
  assert!(session[0].contains("Secure"));
  assert!(session[0].contains("HttpOnly"));
  assert!(session[0].contains("Max-Age=43200"));
  assert!(notice[0].contains("Secure"));
}

#[tokio::test]
async fn notice_cookie_is_not_secure_by_default() {
  let app = router(make_state().await);
  let resp = register(&app, "alice", "student").await;
  let notice = set_cookie_lines(&resp, FLASH_COOKIE);
  assert_eq!(notice.len(), 1);
  assert!(!notice[0].contains("Secure"));
}

#[test]
fn session_ttl_must_be_positive_and_representable() {
  let mut cfg = config(false);
  assert_eq!(cfg.session_ttl(), Some(chrono::Duration::hours(12)));

  for hours in [0, -1, i64::MAX, i64::MIN] {
    cfg.session_ttl_hours = hours;
    assert_eq!(cfg.session_ttl(), None, "{hours}");
  }
}

#[tokio::test]
async fn unrepresentable_session_ttl_fails_login_without_session() {
  let mut cfg = config(false);
  cfg.session_ttl_hours = i64::MAX;
  let app = router(state_with(cfg).await);
  register(&app, "alice", "student").await;

  let resp = send(&app, post_form("/login", "username=alice&password=hunter2", None)).await;
  assert_eq!(location(&resp), "/login");
  assert!(set_cookie(&resp, SESSION_COOKIE).is_none());
}

// ─── Pages ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_delivers_and_clears_pending_notice() {
  let app = router(make_state().await);
  let token = signed_in(&app, "alice", "student").await;

  let pending = Flash::success("Hello").encode();
  let req = Request::builder()
    .uri("/student_dashboard")
    .header(
      header::COOKIE,
      format!("{SESSION_COOKIE}={token}; {FLASH_COOKIE}={pending}"),
    )
    .body(Body::empty())
    .unwrap();
  let resp = send(&app, req).await;

  assert_eq!(set_cookie(&resp, FLASH_COOKIE).as_deref(), Some(""));
  let body = json_body(resp).await;
  assert_eq!(body["notice"]["message"], "Hello");
  assert!(body["available"].is_array());
  assert!(body["enrolled"].is_array());
}

#[tokio::test]
async fn home_shows_identity_when_signed_in() {
  let app = router(make_state().await);

  let body = json_body(send(&app, get_req("/", None)).await).await;
  assert!(body["user"].is_null());

  let token = signed_in(&app, "alice", "student").await;
  let body = json_body(send(&app, get_req("/", Some(&token))).await).await;
  assert_eq!(body["user"]["username"], "alice");
  assert_eq!(body["user"]["role"], "student");
}

// ─── Enrollment and search ───────────────────────────────────────────────────

#[tokio::test]
async fn enrolling_twice_warns() {
  let state = make_state().await;
  let app = router(state.clone());
  let physics = course(&state, "Physics", "Dr. Smith").await;
  let token = signed_in(&app, "alice", "student").await;
  let uri = format!("/enroll/{}", physics.id);

  let first = send(&app, post_form(&uri, "", Some(&token))).await;
  assert_eq!(location(&first), "/student_dashboard");
  assert_eq!(notice(&first).level, Level::Success);

  let second = send(&app, post_form(&uri, "", Some(&token))).await;
  assert_eq!(notice(&second).level, Level::Warning);
  assert_eq!(notice(&second).message, "You are already enrolled in this course.");

  let stats = state.store.enrollment_counts().await.unwrap();
  assert_eq!(stats[0].student_count, 1);
}

#[tokio::test]
async fn enrolling_in_missing_course_reports_not_found() {
  let app = router(make_state().await);
  let token = signed_in(&app, "alice", "student").await;

  let resp = send(&app, post_form("/enroll/999", "", Some(&token))).await;
  assert_eq!(location(&resp), "/student_dashboard");
  assert_eq!(notice(&resp).message, "Course not found.");
}

#[tokio::test]
async fn search_api_filters_by_text() {
  let state = make_state().await;
  let app = router(state.clone());
  course(&state, "Physics", "Dr. Smith").await;
  course(&state, "Chemistry", "Dr. Jones").await;
  let token = signed_in(&app, "alice", "student").await;

  let resp = send(&app, get_req("/api/search_courses?query=physics", Some(&token))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  let names: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["Physics"]);
}

#[tokio::test]
async fn search_api_rejects_non_numeric_credits() {
  let app = router(make_state().await);
  let token = signed_in(&app, "alice", "student").await;

  let resp = send(&app, get_req("/api/search_courses?min_credits=lots", Some(&token))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = json_body(resp).await;
  assert!(body["error"].as_str().unwrap().contains("min_credits"));
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn student_cannot_delete_course() {
  let state = make_state().await;
  let app = router(state.clone());
  let physics = course(&state, "Physics", "Dr. Smith").await;
  let token = signed_in(&app, "alice", "student").await;

  let uri = format!("/admin/delete_course/{}", physics.id);
  let resp = send(&app, post_form(&uri, "", Some(&token))).await;
  assert_eq!(location(&resp), "/");
  assert_eq!(notice(&resp).message, "Access denied.");
  assert!(state.store.get_course(physics.id).await.unwrap().is_some());
}

#[tokio::test]
async fn admin_adds_and_edits_course() {
  let state = make_state().await;
  let app = router(state.clone());
  let token = signed_in(&app, "root", "admin").await;

  let body = "name=Physics&description=Motion&instructor=Dr.+Smith&credits=4&semester=Fall+2024";
  let resp = send(&app, post_form("/admin/add_course", body, Some(&token))).await;
  assert_eq!(location(&resp), "/admin_dashboard");
  assert_eq!(notice(&resp).message, "Course added successfully!");

  let id = state.store.list_courses().await.unwrap()[0].id;
  let body = "name=Physics+II&description=&instructor=Dr.+Smith&credits=5&semester=Spring+2025";
  let resp = send(&app, post_form(&format!("/admin/edit_course/{id}"), body, Some(&token))).await;
  assert_eq!(location(&resp), "/admin_dashboard");

  let edited = state.store.get_course(id).await.unwrap().unwrap();
  assert_eq!(edited.name, "Physics II");
  assert_eq!(edited.credits, 5);
  assert_eq!(edited.description, "");
}

#[tokio::test]
async fn add_course_with_bad_credits_returns_to_form() {
  let state = make_state().await;
  let app = router(state.clone());
  let token = signed_in(&app, "root", "admin").await;

  let body = "name=Physics&description=Motion&instructor=Dr.+Smith&credits=four&semester=Fall";
  let resp = send(&app, post_form("/admin/add_course", body, Some(&token))).await;
  assert_eq!(location(&resp), "/admin/add_course");
  assert_eq!(notice(&resp).level, Level::Danger);
  assert!(state.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_delete_cascades() {
  let state = make_state().await;
  let app = router(state.clone());
  let physics = course(&state, "Physics", "Dr. Smith").await;
  let chemistry = course(&state, "Chemistry", "Dr. Jones").await;

  let student = signed_in(&app, "alice", "student").await;
  for c in [&physics, &chemistry] {
    send(&app, post_form(&format!("/enroll/{}", c.id), "", Some(&student))).await;
  }
  state
    .store
    .add_resource(NewResource::new(physics.id, "Syllabus", "https://example.edu/syllabus").unwrap())
    .await
    .unwrap();

  let admin = signed_in(&app, "root", "admin").await;
  let uri = format!("/admin/delete_course/{}", physics.id);
  let resp = send(&app, post_form(&uri, "", Some(&admin))).await;
  assert_eq!(location(&resp), "/admin_dashboard");
  assert_eq!(notice(&resp).message, "Course deleted successfully!");

  assert!(state.store.get_course(physics.id).await.unwrap().is_none());
  assert!(state.store.list_resources(physics.id).await.unwrap().is_empty());

  let alice = state.store.find_user_by_username("alice").await.unwrap().unwrap();
  let enrolled = state.store.list_enrolled(alice.id).await.unwrap();
  assert_eq!(enrolled.len(), 1);
  assert_eq!(enrolled[0].id, chemistry.id);
}

// ─── Resources ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_uploads_and_students_view_resources() {
  let state = make_state().await;
  let app = router(state.clone());
  let physics = course(&state, "Physics", "Dr. Smith").await;
  let admin = signed_in(&app, "root", "admin").await;

  let upload = format!("/admin/upload_resource/{}", physics.id);
  let body = "resource_name=Lecture+1&resource_link=https%3A%2F%2Fexample.edu%2Fl1";
  let resp = send(&app, post_form(&upload, body, Some(&admin))).await;
  assert_eq!(location(&resp), upload);
  assert_eq!(notice(&resp).message, "Resource link added successfully!");

  let bad = "resource_name=Lecture+2&resource_link=not+a+url";
  let resp = send(&app, post_form(&upload, bad, Some(&admin))).await;
  assert_eq!(location(&resp), upload);
  assert_eq!(notice(&resp).level, Level::Danger);

  let student = signed_in(&app, "alice", "student").await;
  let resp = send(&app, get_req(&format!("/resources/{}", physics.id), Some(&student))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["course"]["name"], "Physics");
  assert_eq!(body["back_to_dashboard"], "/student_dashboard");
  assert_eq!(body["resources"].as_array().unwrap().len(), 1);
  assert_eq!(body["resources"][0]["name"], "Lecture 1");

  let rid = body["resources"][0]["id"].as_i64().unwrap();
  let uri = format!("/admin/delete_resource/{rid}/{}", physics.id);
  let resp = send(&app, post_form(&uri, "", Some(&student))).await;
  assert_eq!(location(&resp), "/");

  let resp = send(&app, post_form(&uri, "", Some(&admin))).await;
  assert_eq!(location(&resp), upload);
  assert!(state.store.list_resources(physics.id).await.unwrap().is_empty());
}
