//! Note — a comment attached to a subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CreatedBy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id:              Uuid,
  pub text:            String,
  pub created_at:      DateTime<Utc>,
  pub created_by_uid:  String,
  pub created_by_name: String,
  pub subject_id:      Uuid,
}

/// Input to [`crate::store::ParliamentStore::add_note`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
  pub subject_id: Uuid,
  pub text:       String,
  pub created_by: CreatedBy,
}

impl NewNote {
  pub fn new(subject_id: Uuid, text: impl Into<String>, created_by: CreatedBy) -> Self {
    Self { subject_id, text: text.into(), created_by }
  }
}
