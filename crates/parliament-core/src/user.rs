//! AppUser — an application identity with a role drawn from a fixed set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

/// The closed set of roles a user may hold.
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
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Student,
  /// A shared terminal account, e.g. a hallway display.
  Kiosk,
}

impl Role {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownRole(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
  pub id:             Uuid,
  pub username:       String,
  /// Lower-cased `username`, used for case-insensitive lookup.
  pub username_lower: String,
  pub first_name:     String,
  pub last_name:      String,
  pub role:           Role,
  /// Serialized as `YYYY-MM-DD`.
  pub birthday:       Option<NaiveDate>,
  /// Class or cohort label, e.g. `"7b"`.
  pub class_id:       Option<String>,
  /// PHC-formatted hash; never plaintext.
  pub password_hash:  String,
  pub created_at:     DateTime<Utc>,
  pub email:          Option<String>,
  /// Identity reference in the external auth provider.
  pub uid:            Option<String>,
}

impl AppUser {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input to [`crate::store::ParliamentStore::create_user`].
/// `username_lower` is derived by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          Role,
  #[serde(default)]
  pub birthday:      Option<NaiveDate>,
  #[serde(default)]
  pub class_id:      Option<String>,
  pub password_hash: String,
  #[serde(default)]
  pub email:         Option<String>,
  #[serde(default)]
  pub uid:           Option<String>,
}

impl NewUser {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    username: impl Into<String>,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    role: Role,
    password_hash: impl Into<String>,
  ) -> Self {
    Self {
      username: username.into(),
      first_name: first_name.into(),
      last_name: last_name.into(),
      role,
      birthday: None,
      class_id: None,
      password_hash: password_hash.into(),
      email: None,
      uid: None,
    }
  }
}
