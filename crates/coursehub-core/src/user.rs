//! Users, roles and the authenticated identity carried through a request.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// The closed set of roles a user may hold.
///
/// Parsing rejects anything but the two lowercase names, so a client cannot
/// smuggle in a role the policy does not know about.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Student,
  Admin,
}

impl Role {
  /// Parse untrusted input (e.g. a form field) into a role.
  pub fn parse(raw: &str) -> Result<Self> {
    raw
      .trim()
      .parse()
      .map_err(|_| Error::validation(format!("unknown role {raw:?}")))
  }
}

/// A persisted user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  pub username:      String,
  /// Opaque PHC string; never leaves the server.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:          Role,
}

impl User {
  pub fn identity(&self) -> Identity {
    Identity {
      id:       self.id,
      username: self.username.clone(),
      role:     self.role,
    }
  }
}

/// Input to [`PortalStore::create_user`](crate::store::PortalStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
}

/// Raw registration input as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  #[serde(default)]
  pub role:     String,
}

/// The authenticated principal acting in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:       i64,
  pub username: String,
  pub role:     Role,
}
