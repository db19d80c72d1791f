//! SQL schema for the coursehub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('student', 'admin'))
);

-- Only the SHA-256 of the client token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    created_at  INTEGER NOT NULL,   -- unix seconds
    expires_at  INTEGER NOT NULL    -- unix seconds
);

CREATE TABLE IF NOT EXISTS courses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    instructor  TEXT NOT NULL,
    credits     INTEGER NOT NULL,
    semester    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS resources (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id   INTEGER NOT NULL REFERENCES courses(id),
    name        TEXT NOT NULL,
    link        TEXT NOT NULL,
    upload_date TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- The composite key is what keeps a student to one row per course,
-- including under concurrent double submission.
CREATE TABLE IF NOT EXISTS enrollments (
    student_id  INTEGER NOT NULL REFERENCES users(id),
    course_id   INTEGER NOT NULL REFERENCES courses(id),
    enrolled_at TEXT NOT NULL,
    PRIMARY KEY (student_id, course_id)
);

CREATE INDEX IF NOT EXISTS resources_course_idx   ON resources(course_id);
CREATE INDEX IF NOT EXISTS enrollments_course_idx ON enrollments(course_id);
CREATE INDEX IF NOT EXISTS sessions_expiry_idx    ON sessions(expires_at);

PRAGMA user_version = 1;
";
