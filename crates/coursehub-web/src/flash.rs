//! One-shot notices carried across a redirect in a cookie, and the JSON page
//! envelope that delivers them.
//!
//! POST handlers answer with `303 See Other` and attach a [`Flash`] to the
//! response. The [`deliver`] middleware moves it into the notice cookie; the
//! next GET page includes the notice in its body and removes the cookie.

use axum::{
  Json,
  extract::{Request, State},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use coursehub_core::store::PortalStore;
use serde::{Deserialize, Serialize};

use crate::{AppState, cookies};

pub const FLASH_COOKIE: &str = "coursehub_notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Success,
  Warning,
  Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
  pub level:   Level,
  pub message: String,
}

impl Flash {
  pub fn success(message: impl Into<String>) -> Self {
    Self { level: Level::Success, message: message.into() }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self { level: Level::Warning, message: message.into() }
  }

  pub fn danger(message: impl Into<String>) -> Self {
    Self { level: Level::Danger, message: message.into() }
  }

  pub fn encode(&self) -> String {
    // Serialising a two-field struct of plain strings cannot fail.
    B64.encode(serde_json::to_vec(self).unwrap_or_default())
  }

  pub fn decode(raw: &str) -> Option<Self> {
    let bytes = B64.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
  }
}

/// `303 See Other` to `to`, carrying `flash` for the next page.
pub fn redirect(to: &str, flash: Flash) -> Response {
  let mut response = Redirect::to(to).into_response();
  response.extensions_mut().insert(flash);
  response
}

/// Middleware: turn a [`Flash`] attached to the response into the notice
/// cookie, honouring `secure_cookies`.
pub async fn deliver<S>(
  State(state): State<AppState<S>>,
  request: Request,
  next: Next,
) -> Response
where
  S: PortalStore + Clone + Send + Sync + 'static,
{
  let mut response = next.run(request).await;
  match response.extensions_mut().remove::<Flash>() {
    Some(flash) => {
      let cookie = cookies::site(FLASH_COOKIE, flash.encode(), None, state.config.secure_cookies);
      (CookieJar::new().add(cookie), response).into_response()
    }
    None => response,
  }
}

/// The JSON body of a GET page: the pending notice plus the page's data.
#[derive(Debug, Serialize)]
pub struct Page<T> {
  pub notice: Option<Flash>,
  #[serde(flatten)]
  pub data:   T,
}

/// Render `data` as a page, consuming any pending notice.
pub fn page<T: Serialize>(jar: CookieJar, data: T) -> Response {
  let Some(pending) = jar.get(FLASH_COOKIE) else {
    return Json(Page { notice: None, data }).into_response();
  };
  let notice = Flash::decode(pending.value_trimmed());
  (jar.remove(cookies::removal(FLASH_COOKIE)), Json(Page { notice, data })).into_response()
}
