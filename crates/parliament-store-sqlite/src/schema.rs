//! SQL schema for the parliament SQLite store.
//!
//! [`CONNECTION_PRAGMAS`] run on every open. [`SCHEMA`] runs only while the
//! database's `PRAGMA user_version` is below [`SCHEMA_VERSION`].

/// Per-connection settings. `foreign_keys` is not persisted by SQLite.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// The `user_version` that [`SCHEMA`] leaves behind.
pub const SCHEMA_VERSION: i64 = 1;

/// Schema DDL for version 1. Also idempotent through `IF NOT EXISTS`.
pub const SCHEMA: &str = "

CREATE TABLE IF NOT EXISTS sessions (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    date            TEXT NOT NULL,   -- ISO 8601 UTC
    is_open         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    created_by_uid  TEXT NOT NULL,
    created_by_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    created_by_uid  TEXT NOT NULL,
    created_by_name TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'approved', 'rejected')),
    status_reason   TEXT NOT NULL DEFAULT '',
    date_id         TEXT NOT NULL REFERENCES sessions(id),
    date_title      TEXT NOT NULL,   -- copy of sessions.title
    notes_count     INTEGER NOT NULL DEFAULT 0 CHECK (notes_count >= 0)
);

CREATE TABLE IF NOT EXISTS notes (
    id              TEXT PRIMARY KEY,
    text            TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    created_by_uid  TEXT NOT NULL,
    created_by_name TEXT NOT NULL,
    subject_id      TEXT NOT NULL REFERENCES subjects(id)
);

CREATE TABLE IF NOT EXISTS users (
    id              TEXT PRIMARY KEY,
    username        TEXT NOT NULL,
    username_lower  TEXT NOT NULL UNIQUE,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    role            TEXT NOT NULL
                    CHECK (role IN ('admin', 'teacher', 'student', 'kiosk')),
    birthday        TEXT,            -- YYYY-MM-DD
    class_id        TEXT,
    password_hash   TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    email           TEXT,
    uid             TEXT
);

CREATE INDEX IF NOT EXISTS subjects_date_idx ON subjects(date_id);
CREATE INDEX IF NOT EXISTS notes_subject_idx ON notes(subject_id);
CREATE INDEX IF NOT EXISTS users_role_idx    ON users(role);

PRAGMA user_version = 1;
";
