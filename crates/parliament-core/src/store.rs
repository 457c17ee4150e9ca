//! The `ParliamentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `parliament-store-sqlite`). Higher layers (`parliament-api`,
//! `parliament-server`) depend on this abstraction, not on any concrete
//! backend.
//!
//! Every write that touches a denormalized field (`dateTitle`, `notesCount`,
//! `usernameLower`) updates the copy together with its source of truth, so
//! [`crate::integrity::check`] stays clean after any sequence of calls.

use std::future::Future;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Classify,
  integrity::Snapshot,
  note::{NewNote, Note},
  session::{NewSession, Session},
  subject::{NewSubject, Subject, SubjectStatus},
  user::{AppUser, NewUser, Role},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ParliamentStore::list_subjects`]. Unset fields match all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectQuery {
  pub date_id:        Option<Uuid>,
  pub status:         Option<SubjectStatus>,
  pub created_by_uid: Option<String>,
}

impl SubjectQuery {
  pub fn for_session(date_id: Uuid) -> Self {
    Self { date_id: Some(date_id), ..Self::default() }
  }

  pub fn matches(&self, subject: &Subject) -> bool {
    self.date_id.is_none_or(|id| id == subject.date_id)
      && self.status.is_none_or(|s| s == subject.status)
      && self
        .created_by_uid
        .as_deref()
        .is_none_or(|uid| uid == subject.created_by_uid)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a parliament store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ParliamentStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a new session. `id` and `created_at` are set by the store.
  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Retrieve a session by id. Returns `None` if not found.
  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// List sessions ordered by `date`; with `open_only`, only those accepting
  /// subjects.
  fn list_sessions(
    &self,
    open_only: bool,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Open or close a session for new subjects.
  fn set_session_open(
    &self,
    id: Uuid,
    is_open: bool,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Retitle a session and rewrite `date_title` on all of its subjects in the
  /// same transaction.
  fn rename_session(
    &self,
    id: Uuid,
    title: String,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Delete a session. Fails while any subject still references it.
  fn delete_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Submit a subject for an open session. The result is pending, has no
  /// notes, and carries the session's title as `date_title`.
  fn submit_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// List subjects matching `query`, oldest first.
  fn list_subjects<'a>(
    &'a self,
    query: &'a SubjectQuery,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  /// Record a review decision (or reset to pending) with its reason.
  fn set_subject_status(
    &self,
    id: Uuid,
    status: SubjectStatus,
    reason: String,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Delete a subject together with all of its notes.
  fn delete_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Notes ─────────────────────────────────────────────────────────────

  /// Attach a note and increment the subject's `notes_count` atomically.
  fn add_note(
    &self,
    input: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// Notes for a subject, oldest first.
  fn list_notes(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  /// Delete a note and decrement the subject's `notes_count` atomically.
  fn delete_note(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user, deriving `username_lower`. Usernames are unique
  /// case-insensitively.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<AppUser, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AppUser>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by username.
  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<AppUser>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<AppUser>, Self::Error>> + Send + '_;

  /// Change a username, re-deriving `username_lower`.
  fn rename_user(
    &self,
    id: Uuid,
    username: String,
  ) -> impl Future<Output = Result<AppUser, Self::Error>> + Send + '_;

  fn set_user_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<AppUser, Self::Error>> + Send + '_;

  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Integrity ─────────────────────────────────────────────────────────

  /// Read every collection in one consistent pass.
  fn snapshot(&self) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;
}
