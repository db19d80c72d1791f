//! Password hashing, session issue/teardown and the identity extractors.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::request::Parts,
  response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use coursehub_core::{
  Error as CoreError,
  service::PasswordScheme,
  session::Session,
  store::PortalStore,
  user::Identity,
};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

use crate::{
  AppState, cookies,
  error::Failure,
  flash::{self, Flash},
};

pub const SESSION_COOKIE: &str = "coursehub_session";

// ─── Password hashing ────────────────────────────────────────────────────────

/// argon2id with default parameters, producing PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Passwords;

impl PasswordScheme for Argon2Passwords {
  fn hash(&self, plaintext: &str) -> coursehub_core::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(plaintext.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| CoreError::Hashing(e.to_string()))
  }

  fn verify(&self, plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
      return false;
    };
    Argon2::default()
      .verify_password(plaintext.as_bytes(), &parsed)
      .is_ok()
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// A fresh 256-bit session token, hex encoded.
fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The digest under which a token is stored.
pub fn token_hash(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Persist a new session for `identity` and add its cookie to `jar`.
pub async fn start_session<S>(
  state:    &AppState<S>,
  identity: &Identity,
  jar:      CookieJar,
) -> Result<CookieJar, CoreError>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let now = Utc::now();
  let out_of_range = || CoreError::Validation("session lifetime is out of range".into());
  let ttl = state.config.session_ttl().ok_or_else(out_of_range)?;
  let expires_at = now.checked_add_signed(ttl).ok_or_else(out_of_range)?;

  let purged = state
    .store
    .purge_sessions(now)
    .await
    .map_err(|e| CoreError::Store(Box::new(e)))?;
  if purged > 0 {
    tracing::debug!(purged, "expired sessions removed");
  }

  let token = new_token();
  state
    .store
    .open_session(Session {
      token_hash: token_hash(&token),
      user_id:    identity.id,
      created_at: now,
      expires_at,
    })
    .await
    .map_err(|e| CoreError::Store(Box::new(e)))?;

  tracing::info!(user_id = identity.id, role = %identity.role, "session started");
  Ok(jar.add(cookies::site(
    SESSION_COOKIE,
    token,
    Some(ttl),
    state.config.secure_cookies,
  )))
}

/// Invalidate the session named by the jar's cookie, if any, and remove the
/// cookie.
pub async fn end_session<S>(state: &AppState<S>, jar: CookieJar) -> Result<CookieJar, CoreError>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  if let Some(cookie) = jar.get(SESSION_COOKIE) {
    state
      .store
      .close_session(&token_hash(cookie.value_trimmed()))
      .await
      .map_err(|e| CoreError::Store(Box::new(e)))?;
  }
  Ok(jar.remove(cookies::removal(SESSION_COOKIE)))
}

async fn resolve<S>(state: &AppState<S>, jar: &CookieJar) -> Result<Option<Identity>, Response>
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let Some(cookie) = jar.get(SESSION_COOKIE) else {
    return Ok(None);
  };
  let hash = token_hash(cookie.value_trimmed());
  state
    .store
    .session_identity(&hash, Utc::now())
    .await
    .map_err(|e| Failure::new(CoreError::Store(Box::new(e)), "/").into_response())
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The authenticated identity. Requests without a live session are
/// redirected to the login page.
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    match resolve(state, &jar).await? {
      Some(identity) => Ok(CurrentUser(identity)),
      None => Err(flash::redirect(
        "/login",
        Flash::danger("Please log in to access this page."),
      )),
    }
  }
}

/// The identity if a live session exists; never rejects for lack of one.
pub struct MaybeUser(pub Option<Identity>);

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    Ok(MaybeUser(resolve(state, &jar).await?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn argon2_round_trip() {
    let hash = Argon2Passwords.hash("secret").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(Argon2Passwords.verify("secret", &hash));
    assert!(!Argon2Passwords.verify("wrong", &hash));
  }

  #[test]
  fn verify_rejects_garbage_hash() {
    assert!(!Argon2Passwords.verify("secret", "not-a-phc-string"));
  }

  #[test]
  fn tokens_are_unique_and_hashed() {
    let a = new_token();
    let b = new_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 64);
    assert_eq!(token_hash(&a).len(), 64);
    assert_ne!(token_hash(&a), a);
  }
}
