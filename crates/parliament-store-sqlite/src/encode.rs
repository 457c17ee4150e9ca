//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings, birthdays as `YYYY-MM-DD`,
//! UUIDs as hyphenated lowercase strings and enumerations by their lowercase
//! names.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use parliament_core::{
  note::Note,
  session::Session,
  subject::{Subject, SubjectStatus},
  user::{AppUser, Role},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Fixed-width nanosecond form so that text ordering matches time ordering.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SESSION_COLUMNS: &str =
  "id, title, date, is_open, created_at, created_by_uid, created_by_name";

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub id:              String,
  pub title:           String,
  pub date:            String,
  pub is_open:         bool,
  pub created_at:      String,
  pub created_by_uid:  String,
  pub created_by_name: String,
}

impl RawSession {
  /// Column order must match [`SESSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      title:           row.get(1)?,
      date:            row.get(2)?,
      is_open:         row.get(3)?,
      created_at:      row.get(4)?,
      created_by_uid:  row.get(5)?,
      created_by_name: row.get(6)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      id:              decode_uuid(&self.id)?,
      title:           self.title,
      date:            decode_dt(&self.date)?,
      is_open:         self.is_open,
      created_at:      decode_dt(&self.created_at)?,
      created_by_uid:  self.created_by_uid,
      created_by_name: self.created_by_name,
    })
  }
}

pub const SUBJECT_COLUMNS: &str = "id, title, description, created_by_uid, \
  created_by_name, created_at, status, status_reason, date_id, date_title, \
  notes_count";

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub id:              String,
  pub title:           String,
  pub description:     String,
  pub created_by_uid:  String,
  pub created_by_name: String,
  pub created_at:      String,
  pub status:          String,
  pub status_reason:   String,
  pub date_id:         String,
  pub date_title:      String,
  pub notes_count:     u32,
}

impl RawSubject {
  /// Column order must match [`SUBJECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      title:           row.get(1)?,
      description:     row.get(2)?,
      created_by_uid:  row.get(3)?,
      created_by_name: row.get(4)?,
      created_at:      row.get(5)?,
      status:          row.get(6)?,
      status_reason:   row.get(7)?,
      date_id:         row.get(8)?,
      date_title:      row.get(9)?,
      notes_count:     row.get(10)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:              decode_uuid(&self.id)?,
      title:           self.title,
      description:     self.description,
      created_by_uid:  self.created_by_uid,
      created_by_name: self.created_by_name,
      created_at:      decode_dt(&self.created_at)?,
      status:          SubjectStatus::parse(&self.status)?,
      status_reason:   self.status_reason,
      date_id:         decode_uuid(&self.date_id)?,
      date_title:      self.date_title,
      notes_count:     self.notes_count,
    })
  }
}

pub const NOTE_COLUMNS: &str =
  "id, text, created_at, created_by_uid, created_by_name, subject_id";

/// Raw values read directly from a `notes` row.
pub struct RawNote {
  pub id:              String,
  pub text:            String,
  pub created_at:      String,
  pub created_by_uid:  String,
  pub created_by_name: String,
  pub subject_id:      String,
}

impl RawNote {
  /// Column order must match [`NOTE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      text:            row.get(1)?,
      created_at:      row.get(2)?,
      created_by_uid:  row.get(3)?,
      created_by_name: row.get(4)?,
      subject_id:      row.get(5)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      id:              decode_uuid(&self.id)?,
      text:            self.text,
      created_at:      decode_dt(&self.created_at)?,
      created_by_uid:  self.created_by_uid,
      created_by_name: self.created_by_name,
      subject_id:      decode_uuid(&self.subject_id)?,
    })
  }
}

pub const USER_COLUMNS: &str = "id, username, username_lower, first_name, \
  last_name, role, birthday, class_id, password_hash, created_at, email, uid";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:             String,
  pub username:       String,
  pub username_lower: String,
  pub first_name:     String,
  pub last_name:      String,
  pub role:           String,
  pub birthday:       Option<String>,
  pub class_id:       Option<String>,
  pub password_hash:  String,
  pub created_at:     String,
  pub email:          Option<String>,
  pub uid:            Option<String>,
}

impl RawUser {
  /// Column order must match [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      username:       row.get(1)?,
      username_lower: row.get(2)?,
      first_name:     row.get(3)?,
      last_name:      row.get(4)?,
      role:           row.get(5)?,
      birthday:       row.get(6)?,
      class_id:       row.get(7)?,
      password_hash:  row.get(8)?,
      created_at:     row.get(9)?,
      email:          row.get(10)?,
      uid:            row.get(11)?,
    })
  }

  pub fn into_user(self) -> Result<AppUser> {
    Ok(AppUser {
      id:             decode_uuid(&self.id)?,
      username:       self.username,
      username_lower: self.username_lower,
      first_name:     self.first_name,
      last_name:      self.last_name,
      role:           Role::parse(&self.role)?,
      birthday:       self.birthday.as_deref().map(decode_date).transpose()?,
      class_id:       self.class_id,
      password_hash:  self.password_hash,
      created_at:     decode_dt(&self.created_at)?,
      email:          self.email,
      uid:            self.uid,
    })
  }
}
