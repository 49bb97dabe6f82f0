//! SQL schema for the rehber SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contacts (
    contact_id       TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    phone            TEXT NOT NULL,   -- dedup key; exact trimmed string
    email            TEXT,
    company          TEXT,
    notes            TEXT,
    source           TEXT NOT NULL,   -- 'manual' | 'import' | 'whatsapp'
    created_at       TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at       TEXT NOT NULL,
    last_interaction TEXT
);

CREATE TABLE IF NOT EXISTS groups (
    group_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    color       TEXT NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    name   TEXT NOT NULL,
    color  TEXT NOT NULL
);

-- Membership sets. ON DELETE CASCADE is what makes deleting a group or tag
-- prune every contact's set in the same statement.
CREATE TABLE IF NOT EXISTS contact_groups (
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id) ON DELETE CASCADE,
    group_id   TEXT NOT NULL REFERENCES groups(group_id)     ON DELETE CASCADE,
    PRIMARY KEY (contact_id, group_id)
);

CREATE TABLE IF NOT EXISTS contact_tags (
    contact_id TEXT NOT NULL REFERENCES contacts(contact_id) ON DELETE CASCADE,
    tag_id     TEXT NOT NULL REFERENCES tags(tag_id)         ON DELETE CASCADE,
    PRIMARY KEY (contact_id, tag_id)
);

CREATE INDEX IF NOT EXISTS contacts_phone_idx   ON contacts(phone);
CREATE INDEX IF NOT EXISTS contacts_created_idx ON contacts(created_at);
CREATE INDEX IF NOT EXISTS contact_groups_group_idx ON contact_groups(group_id);
CREATE INDEX IF NOT EXISTS contact_tags_tag_idx     ON contact_tags(tag_id);

PRAGMA user_version = 1;
";
