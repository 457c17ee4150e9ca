//! Subject — a proposal submitted for discussion in a session.
//!
//! `date_title` and `notes_count` are denormalized: the first copies the
//! referenced session's title, the second caches the number of notes attached
//! to the subject. Both are maintained by the store, never by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{CreatedBy, Error, Result};

/// Review state of a subject. The set is closed; anything else is rejected.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubjectStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl SubjectStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a stored or user-supplied value, rejecting anything outside the
  /// enumeration.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }

  /// `true` once a reviewer has approved or rejected the subject.
  pub fn is_decided(self) -> bool { !matches!(self, Self::Pending) }
}

/// A subject as stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id:              Uuid,
  pub title:           String,
  pub description:     String,
  pub created_by_uid:  String,
  pub created_by_name: String,
  pub created_at:      DateTime<Utc>,
  pub status:          SubjectStatus,
  /// Free-text explanation for the current status; may be empty.
  pub status_reason:   String,
  /// The session this subject was submitted for.
  pub date_id:         Uuid,
  /// Copy of the session's title at the last synchronized write.
  pub date_title:      String,
  /// Number of notes whose `subject_id` is this subject's `id`.
  pub notes_count:     u32,
}

/// Input to [`crate::store::ParliamentStore::submit_subject`].
///
/// Status, status reason, `date_title` and `notes_count` are not accepted from
/// callers; a fresh subject is always pending with no notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub date_id:     Uuid,
  pub created_by:  CreatedBy,
}

impl NewSubject {
  pub fn new(date_id: Uuid, title: impl Into<String>, created_by: CreatedBy) -> Self {
    Self {
      title: title.into(),
      description: String::new(),
      date_id,
      created_by,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }
}
