//! [`SqliteStore`] — the SQLite implementation of [`ParliamentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use parliament_core::{
  Error as CoreError,
  integrity::Snapshot,
  note::{NewNote, Note},
  session::{NewSession, Session},
  store::{ParliamentStore, SubjectQuery},
  subject::{NewSubject, Subject, SubjectStatus},
  user::{AppUser, NewUser, Role},
  validate,
};

use crate::{
  Result,
  encode::{
    NOTE_COLUMNS, RawNote, RawSession, RawSubject, RawUser, SESSION_COLUMNS,
    SUBJECT_COLUMNS, USER_COLUMNS, encode_date, encode_dt, encode_uuid,
  },
  schema::{CONNECTION_PRAGMAS, SCHEMA, SCHEMA_VERSION},
};

/// Outcome of a database closure that may also fail a domain check.
/// The outer `Result` carries SQLite failures, the inner one domain errors.
type Checked<T> = std::result::Result<T, CoreError>;

// ─── Row lookups ─────────────────────────────────────────────────────────────

fn fetch_session(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawSession>> {
  conn
    .query_row(
      &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
      [id],
      RawSession::from_row,
    )
    .optional()
}

fn fetch_subject(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawSubject>> {
  conn
    .query_row(
      &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
      [id],
      RawSubject::from_row,
    )
    .optional()
}

fn fetch_user(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      [id],
      RawUser::from_row,
    )
    .optional()
}

/// Id of the user holding `username_lower`, if any.
fn username_owner(conn: &Connection, username_lower: &str) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT id FROM users WHERE username_lower = ?1",
      [username_lower],
      |r| r.get(0),
    )
    .optional()
}

fn all_sessions(conn: &Connection) -> rusqlite::Result<Vec<RawSession>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY date, rowid"
  ))?;
  stmt.query_map([], RawSession::from_row)?.collect()
}

fn all_subjects(conn: &Connection) -> rusqlite::Result<Vec<RawSubject>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY created_at, rowid"
  ))?;
  stmt.query_map([], RawSubject::from_row)?.collect()
}

fn all_notes(conn: &Connection) -> rusqlite::Result<Vec<RawNote>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at, rowid"
  ))?;
  stmt.query_map([], RawNote::from_row)?.collect()
}

fn all_users(conn: &Connection) -> rusqlite::Result<Vec<RawUser>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {USER_COLUMNS} FROM users ORDER BY username_lower"
  ))?;
  stmt.query_map([], RawUser::from_row)?.collect()
}

fn require_session(raw: Checked<Option<RawSession>>, id: Uuid) -> Result<Session> {
  raw?.ok_or(CoreError::SessionNotFound(id))?.into_session()
}

fn require_subject(raw: Checked<Option<RawSubject>>, id: Uuid) -> Result<Subject> {
  raw?.ok_or(CoreError::SubjectNotFound(id))?.into_subject()
}

fn require_user(raw: Checked<Option<RawUser>>, id: Uuid) -> Result<AppUser> {
  raw?.ok_or(CoreError::UserNotFound(id))?.into_user()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A parliament store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        let version: i64 =
          conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
          conn.execute_batch(SCHEMA)?;
          tracing::info!(from = version, to = SCHEMA_VERSION, "applied schema");
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ParliamentStore impl ────────────────────────────────────────────────────

impl ParliamentStore for SqliteStore {
  type Error = crate::Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Session> {
    validate::new_session(&input)?;

    let session = Session {
      id:              Uuid::new_v4(),
      title:           input.title,
      date:            input.date,
      is_open:         input.is_open,
      created_at:      Utc::now(),
      created_by_uid:  input.created_by.uid,
      created_by_name: input.created_by.name,
    };

    let id_str    = encode_uuid(session.id);
    let title     = session.title.clone();
    let date_str  = encode_dt(session.date);
    let is_open   = session.is_open;
    let at_str    = encode_dt(session.created_at);
    let by_uid    = session.created_by_uid.clone();
    let by_name   = session.created_by_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (
             id, title, date, is_open, created_at, created_by_uid, created_by_name
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, title, date_str, is_open, at_str, by_uid, by_name],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(session_id = %session.id, "created session");
    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_session(conn, &id_str)?))
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(&self, open_only: bool) -> Result<Vec<Session>> {
    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SESSION_COLUMNS} FROM sessions
           WHERE ?1 = 0 OR is_open = 1
           ORDER BY date, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![open_only], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn set_session_open(&self, id: Uuid, is_open: bool) -> Result<Session> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE sessions SET is_open = ?2 WHERE id = ?1",
          rusqlite::params![id_str, is_open],
        )?;
        Ok(Ok(fetch_session(conn, &id_str)?))
      })
      .await?;

    tracing::debug!(session_id = %id, is_open, "set session open flag");
    require_session(raw, id)
  }

  async fn rename_session(&self, id: Uuid, title: String) -> Result<Session> {
    validate::non_blank("title", &title)?;

    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE sessions SET title = ?2 WHERE id = ?1",
          rusqlite::params![id_str, title],
        )?;
        if changed == 0 {
          return Ok(Ok(None));
        }
        tx.execute(
          "UPDATE subjects SET date_title = ?2 WHERE date_id = ?1",
          rusqlite::params![id_str, title],
        )?;
        let raw = fetch_session(&tx, &id_str)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    tracing::debug!(session_id = %id, "renamed session");
    require_session(raw, id)
  }

  async fn delete_session(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let outcome: Checked<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let subjects: i64 = tx.query_row(
          "SELECT COUNT(*) FROM subjects WHERE date_id = ?1",
          [&id_str],
          |r| r.get(0),
        )?;
        if subjects > 0 {
          return Ok(Err(CoreError::SessionHasSubjects(id)));
        }
        if tx.execute("DELETE FROM sessions WHERE id = ?1", [&id_str])? == 0 {
          return Ok(Err(CoreError::SessionNotFound(id)));
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    tracing::debug!(session_id = %id, "deleted session");
    Ok(())
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn submit_subject(&self, input: NewSubject) -> Result<Subject> {
    validate::new_subject(&input)?;

    let mut subject = Subject {
      id:              Uuid::new_v4(),
      title:           input.title,
      description:     input.description,
      created_by_uid:  input.created_by.uid,
      created_by_name: input.created_by.name,
      created_at:      Utc::now(),
      status:          SubjectStatus::Pending,
      status_reason:   String::new(),
      date_id:         input.date_id,
      date_title:      String::new(),
      notes_count:     0,
    };

    let subject: Checked<Subject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let date_id = encode_uuid(subject.date_id);

        let Some(session) = fetch_session(&tx, &date_id)? else {
          return Ok(Err(CoreError::SessionNotFound(subject.date_id)));
        };
        if !session.is_open {
          return Ok(Err(CoreError::SessionClosed(subject.date_id)));
        }
        subject.date_title = session.title;

        tx.execute(
          "INSERT INTO subjects (
             id, title, description, created_by_uid, created_by_name,
             created_at, status, status_reason, date_id, date_title, notes_count
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            encode_uuid(subject.id),
            subject.title,
            subject.description,
            subject.created_by_uid,
            subject.created_by_name,
            encode_dt(subject.created_at),
            subject.status.as_str(),
            subject.status_reason,
            date_id,
            subject.date_title,
            subject.notes_count,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(subject))
      })
      .await?;

    let subject = subject?;
    tracing::debug!(subject_id = %subject.id, date_id = %subject.date_id, "submitted subject");
    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_subject(conn, &id_str)?))
      .await?;
    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
    let date_id = query.date_id.map(encode_uuid);
    let status  = query.status.map(SubjectStatus::as_str);
    let by_uid  = query.created_by_uid.clone();

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects
           WHERE (?1 IS NULL OR date_id = ?1)
             AND (?2 IS NULL OR status = ?2)
             AND (?3 IS NULL OR created_by_uid = ?3)
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date_id, status, by_uid], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn set_subject_status(
    &self,
    id:     Uuid,
    status: SubjectStatus,
    reason: String,
  ) -> Result<Subject> {
    // A pending subject carries no reason.
    let reason = if status.is_decided() { reason } else { String::new() };
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE subjects SET status = ?2, status_reason = ?3 WHERE id = ?1",
          rusqlite::params![id_str, status.as_str(), reason],
        )?;
        Ok(Ok(fetch_subject(conn, &id_str)?))
      })
      .await?;

    tracing::debug!(subject_id = %id, %status, "set subject status");
    require_subject(raw, id)
  }

  async fn delete_subject(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let outcome: Checked<usize> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let notes = tx.execute("DELETE FROM notes WHERE subject_id = ?1", [&id_str])?;
        if tx.execute("DELETE FROM subjects WHERE id = ?1", [&id_str])? == 0 {
          return Ok(Err(CoreError::SubjectNotFound(id)));
        }
        tx.commit()?;
        Ok(Ok(notes))
      })
      .await?;

    let notes = outcome?;
    tracing::debug!(subject_id = %id, notes, "deleted subject and its notes");
    Ok(())
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  async fn add_note(&self, input: NewNote) -> Result<Note> {
    validate::new_note(&input)?;

    let note = Note {
      id:              Uuid::new_v4(),
      text:            input.text,
      created_at:      Utc::now(),
      created_by_uid:  input.created_by.uid,
      created_by_name: input.created_by.name,
      subject_id:      input.subject_id,
    };

    let id_str         = encode_uuid(note.id);
    let text           = note.text.clone();
    let at_str         = encode_dt(note.created_at);
    let by_uid         = note.created_by_uid.clone();
    let by_name        = note.created_by_name.clone();
    let subject_id     = note.subject_id;
    let subject_id_str = encode_uuid(subject_id);

    let outcome: Checked<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE subjects SET notes_count = notes_count + 1 WHERE id = ?1",
          [&subject_id_str],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::SubjectNotFound(subject_id)));
        }
        tx.execute(
          "INSERT INTO notes (
             id, text, created_at, created_by_uid, created_by_name, subject_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, text, at_str, by_uid, by_name, subject_id_str],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    tracing::debug!(note_id = %note.id, subject_id = %note.subject_id, "added note");
    Ok(note)
  }

  async fn list_notes(&self, subject_id: Uuid) -> Result<Vec<Note>> {
    let subject_id_str = encode_uuid(subject_id);
    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes WHERE subject_id = ?1
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map([subject_id_str], RawNote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNote::into_note).collect()
  }

  async fn delete_note(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let outcome: Checked<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let subject_id: Option<String> = tx
          .query_row("SELECT subject_id FROM notes WHERE id = ?1", [&id_str], |r| {
            r.get(0)
          })
          .optional()?;
        let Some(subject_id) = subject_id else {
          return Ok(Err(CoreError::NoteNotFound(id)));
        };
        tx.execute("DELETE FROM notes WHERE id = ?1", [&id_str])?;
        tx.execute(
          "UPDATE subjects SET notes_count = notes_count - 1 WHERE id = ?1",
          [&subject_id],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    tracing::debug!(note_id = %id, "deleted note");
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<AppUser> {
    validate::new_user(&input)?;

    let user = AppUser {
      id:             Uuid::new_v4(),
      username_lower: validate::normalize_username(&input.username),
      username:       input.username,
      first_name:     input.first_name,
      last_name:      input.last_name,
      role:           input.role,
      birthday:       input.birthday,
      class_id:       input.class_id,
      password_hash:  input.password_hash,
      created_at:     Utc::now(),
      email:          input.email,
      uid:            input.uid,
    };

    let row = user.clone();
    let outcome: Checked<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if username_owner(&tx, &row.username_lower)?.is_some() {
          return Ok(Err(CoreError::UsernameTaken(row.username)));
        }
        tx.execute(
          "INSERT INTO users (
             id, username, username_lower, first_name, last_name, role,
             birthday, class_id, password_hash, created_at, email, uid
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            encode_uuid(row.id),
            row.username,
            row.username_lower,
            row.first_name,
            row.last_name,
            row.role.as_str(),
            row.birthday.map(encode_date),
            row.class_id,
            row.password_hash,
            encode_dt(row.created_at),
            row.email,
            row.uid,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    tracing::debug!(user_id = %user.id, role = %user.role, "created user");
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<AppUser>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_user(conn, &id_str)?))
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<AppUser>> {
    let lower = validate::normalize_username(username);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE username_lower = ?1"),
              [lower],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self, role: Option<Role>) -> Result<Vec<AppUser>> {
    let role_str = role.map(Role::as_str);
    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE ?1 IS NULL OR role = ?1
           ORDER BY username_lower"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn rename_user(&self, id: Uuid, username: String) -> Result<AppUser> {
    validate::username(&username)?;

    let id_str = encode_uuid(id);
    let lower  = validate::normalize_username(&username);
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if username_owner(&tx, &lower)?.is_some_and(|owner| owner != id_str) {
          return Ok(Err(CoreError::UsernameTaken(username)));
        }
        tx.execute(
          "UPDATE users SET username = ?2, username_lower = ?3 WHERE id = ?1",
          rusqlite::params![id_str, username, lower],
        )?;
        let raw = fetch_user(&tx, &id_str)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    tracing::debug!(user_id = %id, "renamed user");
    require_user(raw, id)
  }

  async fn set_user_role(&self, id: Uuid, role: Role) -> Result<AppUser> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET role = ?2 WHERE id = ?1",
          rusqlite::params![id_str, role.as_str()],
        )?;
        Ok(Ok(fetch_user(conn, &id_str)?))
      })
      .await?;

    tracing::debug!(user_id = %id, %role, "set user role");
    require_user(raw, id)
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id_str])?))
      .await?;

    if deleted == 0 {
      return Err(CoreError::UserNotFound(id).into());
    }
    tracing::debug!(user_id = %id, "deleted user");
    Ok(())
  }

  // ── Integrity ─────────────────────────────────────────────────────────────

  async fn snapshot(&self) -> Result<Snapshot> {
    let (sessions, subjects, notes, users) = self
      .conn
      .call(|conn| {
        // One read transaction so the four collections agree with each other.
        let tx = conn.transaction()?;
        let rows = (
          all_sessions(&tx)?,
          all_subjects(&tx)?,
          all_notes(&tx)?,
          all_users(&tx)?,
        );
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    Ok(Snapshot {
      sessions: sessions.into_iter().map(RawSession::into_session).collect::<Result<_>>()?,
      subjects: subjects.into_iter().map(RawSubject::into_subject).collect::<Result<_>>()?,
      notes:    notes.into_iter().map(RawNote::into_note).collect::<Result<_>>()?,
      users:    users.into_iter().map(RawUser::into_user).collect::<Result<_>>()?,
    })
  }
}
