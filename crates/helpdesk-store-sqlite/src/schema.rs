//! SQL schema for the helpdesk SQLite store.
//!
//! Executed once at connection startup. There is no migration system; every
//! statement is idempotent.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Username and email uniqueness ignores ASCII case.
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password    TEXT NOT NULL,                    -- argon2 PHC string
    role        TEXT NOT NULL DEFAULT 'user',     -- 'user' | 'admin'
    created_at  TEXT NOT NULL                     -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS tickets (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL CHECK (title != ''),
    description TEXT NOT NULL CHECK (description != ''),
    priority    TEXT NOT NULL DEFAULT 'Medium',   -- Low | Medium | High | Critical
    status      TEXT NOT NULL DEFAULT 'Open',     -- Open | In Progress | Closed
    category    TEXT,
    assigned_to INTEGER REFERENCES users(id),
    created_by  INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Comments are append-only; rows are removed only with their ticket.
CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id   INTEGER NOT NULL REFERENCES tickets(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    comment     TEXT NOT NULL CHECK (comment != ''),
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tickets_created_idx  ON tickets(created_at);
CREATE INDEX IF NOT EXISTS tickets_status_idx   ON tickets(status);
CREATE INDEX IF NOT EXISTS comments_ticket_idx  ON comments(ticket_id);

PRAGMA user_version = 1;
";
