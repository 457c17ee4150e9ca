//! Cross-collection consistency checks.
//!
//! [`check`] walks a [`Snapshot`] of every collection and reports each
//! referential or denormalization invariant that does not hold. Enumeration
//! closure needs no check here: an out-of-set `status` or `role` never
//! deserializes in the first place.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  note::Note,
  session::Session,
  subject::Subject,
  user::AppUser,
  validate::{is_phc_string, normalize_username},
};

/// Every record of every collection, read at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
  pub sessions: Vec<Session>,
  pub subjects: Vec<Subject>,
  pub notes:    Vec<Note>,
  pub users:    Vec<AppUser>,
}

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
  DuplicateId {
    collection: &'static str,
    id:         Uuid,
  },
  DanglingSession {
    subject_id: Uuid,
    date_id:    Uuid,
  },
  StaleDateTitle {
    subject_id: Uuid,
    expected:   String,
    found:      String,
  },
  DanglingSubject {
    note_id:    Uuid,
    subject_id: Uuid,
  },
  NotesCountMismatch {
    subject_id: Uuid,
    recorded:   u32,
    actual:     u32,
  },
  UsernameLowerMismatch {
    user_id:  Uuid,
    expected: String,
    found:    String,
  },
  PlaintextPassword {
    user_id: Uuid,
  },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
  pub violations: Vec<Violation>,
}

impl IntegrityReport {
  pub fn is_clean(&self) -> bool { self.violations.is_empty() }
}

fn duplicates<'a>(
  collection: &'static str,
  ids: impl Iterator<Item = &'a Uuid>,
  out: &mut Vec<Violation>,
) {
  let mut seen = HashSet::new();
  for id in ids {
    if !seen.insert(*id) {
      out.push(Violation::DuplicateId { collection, id: *id });
    }
  }
}

/// Evaluate every invariant against `snapshot`.
pub fn check(snapshot: &Snapshot) -> IntegrityReport {
  let mut violations = Vec::new();

  duplicates("sessions", snapshot.sessions.iter().map(|s| &s.id), &mut violations);
  duplicates("subjects", snapshot.subjects.iter().map(|s| &s.id), &mut violations);
  duplicates("notes", snapshot.notes.iter().map(|n| &n.id), &mut violations);
  duplicates("users", snapshot.users.iter().map(|u| &u.id), &mut violations);

  let sessions: HashMap<Uuid, &Session> =
    snapshot.sessions.iter().map(|s| (s.id, s)).collect();

  let mut note_counts: HashMap<Uuid, u32> = HashMap::new();
  for note in &snapshot.notes {
    *note_counts.entry(note.subject_id).or_default() += 1;
  }

  let subject_ids: HashSet<Uuid> = snapshot.subjects.iter().map(|s| s.id).collect();

  for subject in &snapshot.subjects {
    match sessions.get(&subject.date_id) {
      None => violations.push(Violation::DanglingSession {
        subject_id: subject.id,
        date_id:    subject.date_id,
      }),
      Some(session) if session.title != subject.date_title => {
        violations.push(Violation::StaleDateTitle {
          subject_id: subject.id,
          expected:   session.title.clone(),
          found:      subject.date_title.clone(),
        })
      }
      Some(_) => {}
    }

    let actual = note_counts.get(&subject.id).copied().unwrap_or(0);
    if actual != subject.notes_count {
      violations.push(Violation::NotesCountMismatch {
        subject_id: subject.id,
        recorded:   subject.notes_count,
        actual,
      });
    }
  }

  for note in &snapshot.notes {
    if !subject_ids.contains(&note.subject_id) {
      violations.push(Violation::DanglingSubject {
        note_id:    note.id,
        subject_id: note.subject_id,
      });
    }
  }

  for user in &snapshot.users {
    let expected = normalize_username(&user.username);
    if expected != user.username_lower {
      violations.push(Violation::UsernameLowerMismatch {
        user_id: user.id,
        expected,
        found: user.username_lower.clone(),
      });
    }
    if !is_phc_string(&user.password_hash) {
      violations.push(Violation::PlaintextPassword { user_id: user.id });
    }
  }

  IntegrityReport { violations }
}
