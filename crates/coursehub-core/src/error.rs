//! Error types for `coursehub-core`.

use thiserror::Error;

use crate::{policy::Action, user::Role};

#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication required")]
  Unauthorized,

  #[error("role {role} may not {action}")]
  Forbidden { role: Role, action: Action },

  #[error("course not found: {0}")]
  CourseNotFound(i64),

  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("password hashing failed: {0}")]
  Hashing(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used by boundary layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Unauthorized,
  Forbidden,
  NotFound,
  Conflict,
  Validation,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Unauthorized => ErrorKind::Unauthorized,
      Error::Forbidden { .. } => ErrorKind::Forbidden,
      Error::CourseNotFound(_) => ErrorKind::NotFound,
      Error::UsernameTaken(_) => ErrorKind::Conflict,
      Error::Validation(_) => ErrorKind::Validation,
      Error::Hashing(_) | Error::Store(_) => ErrorKind::Internal,
    }
  }

  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }

  pub(crate) fn validation(msg: impl Into<String>) -> Self {
    Error::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
