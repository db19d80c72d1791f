//! Boundary error types and their `IntoResponse` implementations.
//!
//! Page and form handlers fail with [`Failure`], which becomes a redirect plus
//! a notice. The JSON search endpoint fails with [`ApiError`]. Internal errors
//! are logged here and never shown verbatim.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use coursehub_core::{Error as CoreError, ErrorKind};
use serde_json::json;
use thiserror::Error;

use crate::flash::{self, Flash};

const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

/// A failed page or form action, redirecting to `back` (or to a fixed
/// destination for authentication and authorization failures).
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Failure {
  #[source]
  pub error: CoreError,
  pub back:  String,
}

impl Failure {
  pub fn new(error: CoreError, back: impl Into<String>) -> Self {
    Self { error, back: back.into() }
  }
}

/// Attach a fallback destination to a core result.
pub trait ResultExt<T> {
  fn back_to(self, to: impl Into<String>) -> Result<T, Failure>;
}

impl<T> ResultExt<T> for Result<T, CoreError> {
  fn back_to(self, to: impl Into<String>) -> Result<T, Failure> {
    self.map_err(|e| Failure::new(e, to))
  }
}

impl IntoResponse for Failure {
  fn into_response(self) -> Response {
    let Failure { error, back } = self;
    match error {
      CoreError::Unauthorized => flash::redirect("/login", Flash::danger("Invalid credentials.")),
      CoreError::Forbidden { .. } => flash::redirect("/", Flash::danger("Access denied.")),
      CoreError::CourseNotFound(_) => flash::redirect(&back, Flash::danger("Course not found.")),
      CoreError::UsernameTaken(_) => {
        flash::redirect(&back, Flash::danger("That username is already taken."))
      }
      CoreError::Validation(msg) => flash::redirect(&back, Flash::danger(msg)),
      err @ (CoreError::Hashing(_) | CoreError::Store(_)) => {
        tracing::error!(error = %err, "request failed");
        flash::redirect(&back, Flash::danger(GENERIC_FAILURE))
      }
    }
  }
}

/// An error returned by a JSON API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match self.0.kind() {
      ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
      ErrorKind::Forbidden => StatusCode::FORBIDDEN,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Conflict => StatusCode::CONFLICT,
      ErrorKind::Validation => StatusCode::BAD_REQUEST,
      ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self.0, "api request failed");
      GENERIC_FAILURE.to_owned()
    } else {
      self.0.to_string()
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
