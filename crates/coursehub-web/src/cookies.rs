//! Site-wide cookie shapes used with [`axum_extra::extract::CookieJar`].

use axum_extra::extract::cookie::{Cookie, SameSite};

/// An `HttpOnly`, `SameSite=Lax` cookie scoped to the whole site. Without
/// `max_age` it lives for the browser session.
pub fn site(
  name: &'static str,
  value: String,
  max_age: Option<chrono::Duration>,
  secure: bool,
) -> Cookie<'static> {
  let mut builder = Cookie::build((name, value))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(secure);
  if let Some(age) = max_age {
    builder = builder.max_age(cookie::time::Duration::seconds(age.num_seconds()));
  }
  builder.build()
}

/// The cookie to hand to [`CookieJar::remove`](axum_extra::extract::CookieJar::remove)
/// so the removal matches the path it was set on.
pub fn removal(name: &'static str) -> Cookie<'static> { Cookie::build(name).path("/").build() }
