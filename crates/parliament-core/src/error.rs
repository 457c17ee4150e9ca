//! Error types for `parliament-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("note not found: {0}")]
  NoteNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("session {0} is closed to new subjects")]
  SessionClosed(Uuid),

  #[error("session {0} still has subjects")]
  SessionHasSubjects(Uuid),

  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  #[error("invalid {field}: {reason}")]
  InvalidField {
    field:  &'static str,
    reason: String,
  },

  #[error("unknown subject status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse error category; transports map it to their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Invalid,
  Internal,
}

/// Implemented by every store error so callers can branch without knowing the
/// concrete backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::SessionNotFound(_)
      | Self::SubjectNotFound(_)
      | Self::NoteNotFound(_)
      | Self::UserNotFound(_) => ErrorKind::NotFound,
      Self::SessionClosed(_)
      | Self::SessionHasSubjects(_)
      | Self::UsernameTaken(_) => ErrorKind::Conflict,
      Self::InvalidField { .. }
      | Self::UnknownStatus(_)
      | Self::UnknownRole(_) => ErrorKind::Invalid,
    }
  }
}
