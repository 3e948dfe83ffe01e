//! SQL schema for the Casefile SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Reporter and creator emails are deliberately plain strings with no
/// foreign key into `users`; deleting a user leaves them dangling, and
/// `pdf_history` rows likewise outlive their occurrence.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    user_type     TEXT NOT NULL,   -- 'standard' | 'plus' | 'admin'
    approved      TEXT NOT NULL,   -- 'yes' | 'no'
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS occurrences (
    occurrence_id    TEXT PRIMARY KEY,
    cr               TEXT NOT NULL,
    description      TEXT NOT NULL,
    origin           TEXT NOT NULL,
    action           TEXT NOT NULL,
    start_date       TEXT NOT NULL,   -- ISO 8601 UTC
    due_date         TEXT NOT NULL,
    reporter_email   TEXT NOT NULL,
    creator_email    TEXT NOT NULL,
    creator_name     TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    evidence_path    TEXT,
    evidence_status  TEXT,            -- 'approved' | 'rejected' | NULL
    rejection_reason TEXT,
    decided_at       TEXT,
    uploaded_at      TEXT,
    uploader_name    TEXT,
    approver_name    TEXT
);

-- Rejection audit trail. Strictly append-only:
-- no UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS pdf_history (
    history_id    TEXT PRIMARY KEY,
    occurrence_id TEXT NOT NULL,
    evidence_path TEXT,
    uploaded_at   TEXT,
    uploader_name TEXT,
    reason        TEXT NOT NULL,
    rejected_at   TEXT NOT NULL,
    approver_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS occurrences_reporter_idx   ON occurrences(reporter_email);
CREATE INDEX IF NOT EXISTS occurrences_creator_idx    ON occurrences(creator_email);
CREATE INDEX IF NOT EXISTS occurrences_created_idx    ON occurrences(created_at);
CREATE INDEX IF NOT EXISTS pdf_history_occurrence_idx ON pdf_history(occurrence_id);

PRAGMA user_version = 1;
";
