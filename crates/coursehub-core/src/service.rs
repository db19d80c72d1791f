//! The enrollment service: every portal operation, gated by the access
//! policy and expressed over a [`PortalStore`].
//!
//! A [`Service`] borrows the store for the duration of one request. The
//! acting [`Identity`] is passed explicitly to each operation; there is no
//! ambient "current user".

use serde::Serialize;

use crate::{
  Error, Result,
  course::{Course, CourseFields, CourseQuery, CourseStats},
  enrollment::{CourseRemoval, EnrollStatus},
  policy::{Action, require},
  resource::{NewResource, Resource},
  store::PortalStore,
  user::{Identity, NewUser, Registration, Role, User},
};

// ─── Password hashing seam ───────────────────────────────────────────────────

/// One-way password hashing, supplied by the caller.
pub trait PasswordScheme: Send + Sync {
  /// Produce an opaque, self-describing hash of `plaintext`.
  fn hash(&self, plaintext: &str) -> Result<String>;

  /// Check `plaintext` against a hash produced by [`PasswordScheme::hash`].
  fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

// ─── View models ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
  pub available: Vec<Course>,
  pub enrolled:  Vec<Course>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
  pub courses: Vec<Course>,
  pub stats:   Vec<CourseStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseResources {
  pub course:    Course,
  pub resources: Vec<Resource>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct Service<'a, S> {
  store: &'a S,
}

impl<'a, S> Service<'a, S>
where
  S: PortalStore,
{
  pub fn new(store: &'a S) -> Self { Self { store } }

  // ── Registration / login ──────────────────────────────────────────────

  /// Create a user account. The role must be `student` or `admin`.
  pub async fn register<P: PasswordScheme>(
    &self,
    passwords: &P,
    input: Registration,
  ) -> Result<User> {
    let username = input.username.trim();
    if username.is_empty() {
      return Err(Error::validation("username is required"));
    }
    if input.password.is_empty() {
      return Err(Error::validation("password is required"));
    }
    let role = Role::parse(&input.role)?;

    let password_hash = passwords.hash(&input.password)?;
    let user = self
      .store
      .create_user(NewUser { username: username.to_owned(), password_hash, role })
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UsernameTaken(username.to_owned()))?;

    tracing::info!(user_id = user.id, role = %user.role, "user registered");
    Ok(user)
  }

  /// Check credentials. Unknown usernames and wrong passwords are
  /// indistinguishable to the caller.
  pub async fn login<P: PasswordScheme>(
    &self,
    passwords: &P,
    username: &str,
    password: &str,
  ) -> Result<Identity> {
    let user = self
      .store
      .find_user_by_username(username.trim())
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;

    if !passwords.verify(password, &user.password_hash) {
      tracing::info!(user_id = user.id, "login rejected");
      return Err(Error::Unauthorized);
    }

    Ok(user.identity())
  }

  // ── Student side ──────────────────────────────────────────────────────

  pub async fn search_courses(
    &self,
    actor: &Identity,
    query: CourseQuery,
  ) -> Result<Vec<Course>> {
    require(actor, Action::SearchCourses)?;
    let query = query.normalized();
    self.store.search_courses(&query).await.map_err(Error::store)
  }

  pub async fn student_dashboard(
    &self,
    actor: &Identity,
    search: Option<String>,
  ) -> Result<StudentDashboard> {
    require(actor, Action::ViewStudentDashboard)?;

    let query = CourseQuery { text: search, ..CourseQuery::default() }.normalized();
    let available = self.store.search_courses(&query).await.map_err(Error::store)?;
    let enrolled = self.store.list_enrolled(actor.id).await.map_err(Error::store)?;

    Ok(StudentDashboard { available, enrolled })
  }

  pub async fn list_enrolled(&self, actor: &Identity) -> Result<Vec<Course>> {
    require(actor, Action::ViewStudentDashboard)?;
    self.store.list_enrolled(actor.id).await.map_err(Error::store)
  }

  /// Enroll the acting student. Enrolling twice reports
  /// [`EnrollStatus::AlreadyEnrolled`] and leaves a single row.
  pub async fn enroll(&self, actor: &Identity, course_id: i64) -> Result<EnrollStatus> {
    require(actor, Action::Enroll)?;

    let status = self
      .store
      .enroll(actor.id, course_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CourseNotFound(course_id))?;

    match &status {
      EnrollStatus::Enrolled(_) => {
        tracing::info!(student_id = actor.id, course_id, "enrolled");
      }
      EnrollStatus::AlreadyEnrolled => {
        tracing::debug!(student_id = actor.id, course_id, "already enrolled");
      }
    }
    Ok(status)
  }

  /// Remove the acting student's enrollment. Idempotent; returns whether a
  /// row was removed.
  pub async fn unenroll(&self, actor: &Identity, course_id: i64) -> Result<bool> {
    require(actor, Action::Unenroll)?;

    let removed = self
      .store
      .unenroll(actor.id, course_id)
      .await
      .map_err(Error::store)?;
    if removed {
      tracing::info!(student_id = actor.id, course_id, "unenrolled");
    }
    Ok(removed)
  }

  // ── Admin side ────────────────────────────────────────────────────────

  pub async fn admin_dashboard(&self, actor: &Identity) -> Result<AdminDashboard> {
    require(actor, Action::ViewAdminDashboard)?;

    let courses = self.store.list_courses().await.map_err(Error::store)?;
    let stats = self.store.enrollment_counts().await.map_err(Error::store)?;
    Ok(AdminDashboard { courses, stats })
  }

  pub async fn add_course(&self, actor: &Identity, fields: CourseFields) -> Result<Course> {
    require(actor, Action::ManageCourses)?;
    let fields = fields.validate()?;

    let course = self.store.add_course(fields).await.map_err(Error::store)?;
    tracing::info!(course_id = course.id, "course added");
    Ok(course)
  }

  /// Fetch a single course for editing.
  pub async fn course(&self, actor: &Identity, course_id: i64) -> Result<Course> {
    require(actor, Action::ManageCourses)?;
    self.find_course(course_id).await
  }

  pub async fn edit_course(
    &self,
    actor: &Identity,
    course_id: i64,
    fields: CourseFields,
  ) -> Result<Course> {
    require(actor, Action::ManageCourses)?;
    let fields = fields.validate()?;

    let course = self
      .store
      .update_course(course_id, fields)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CourseNotFound(course_id))?;
    tracing::info!(course_id, "course updated");
    Ok(course)
  }

  /// Delete a course together with its enrollments and resources.
  pub async fn delete_course(&self, actor: &Identity, course_id: i64) -> Result<CourseRemoval> {
    require(actor, Action::ManageCourses)?;

    let removal = self
      .store
      .delete_course(course_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CourseNotFound(course_id))?;
    tracing::info!(
      course_id,
      enrollments = removal.enrollments_removed,
      resources = removal.resources_removed,
      "course deleted"
    );
    Ok(removal)
  }

  pub async fn add_resource(
    &self,
    actor: &Identity,
    course_id: i64,
    name: &str,
    link: &str,
  ) -> Result<Resource> {
    require(actor, Action::ManageResources)?;
    let input = NewResource::new(course_id, name, link)?;

    let resource = self
      .store
      .add_resource(input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CourseNotFound(course_id))?;
    tracing::info!(course_id, resource_id = resource.id, "resource added");
    Ok(resource)
  }

  /// Returns whether a resource was removed; an unknown id is a no-op.
  pub async fn delete_resource(&self, actor: &Identity, resource_id: i64) -> Result<bool> {
    require(actor, Action::ManageResources)?;

    let removed = self
      .store
      .delete_resource(resource_id)
      .await
      .map_err(Error::store)?;
    if removed {
      tracing::info!(resource_id, "resource deleted");
    }
    Ok(removed)
  }

  // ── Shared ────────────────────────────────────────────────────────────

  pub async fn course_resources(
    &self,
    actor: &Identity,
    course_id: i64,
  ) -> Result<CourseResources> {
    require(actor, Action::ViewResources)?;

    let course = self.find_course(course_id).await?;
    let resources = self
      .store
      .list_resources(course_id)
      .await
      .map_err(Error::store)?;
    Ok(CourseResources { course, resources })
  }

  async fn find_course(&self, course_id: i64) -> Result<Course> {
    self
      .store
      .get_course(course_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CourseNotFound(course_id))
  }
}
