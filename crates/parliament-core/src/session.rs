//! Session — a scheduled parliament meeting that collects subject proposals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CreatedBy;

/// A scheduled session (the web client calls it a "parliament date").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub id:              Uuid,
  pub title:           String,
  /// When the session takes place.
  pub date:            DateTime<Utc>,
  /// Whether new subjects may be submitted for this session.
  pub is_open:         bool,
  pub created_at:      DateTime<Utc>,
  pub created_by_uid:  String,
  pub created_by_name: String,
}

impl Session {
  pub fn created_by(&self) -> CreatedBy {
    CreatedBy::new(&self.created_by_uid, &self.created_by_name)
  }
}

/// Input to [`crate::store::ParliamentStore::create_session`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
  pub title:      String,
  pub date:       DateTime<Utc>,
  #[serde(default)]
  pub is_open:    bool,
  pub created_by: CreatedBy,
}

impl NewSession {
  /// A closed session; call `set_session_open` once it should take subjects.
  pub fn new(title: impl Into<String>, date: DateTime<Utc>, created_by: CreatedBy) -> Self {
    Self { title: title.into(), date, is_open: false, created_by }
  }

  pub fn open(mut self) -> Self {
    self.is_open = true;
    self
  }
}
