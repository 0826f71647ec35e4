//! SQL schema for the Margin SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS` and
/// `INSERT OR IGNORE` for the seed rows.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    pubid       TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    authority   TEXT NOT NULL,
    logo        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS groups (
    pubid        TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    authority    TEXT NOT NULL,
    creator      TEXT,
    organization TEXT REFERENCES organizations(pubid),
    readable_by  TEXT NOT NULL,  -- 'world' | 'members'
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS group_members (
    pubid   TEXT NOT NULL REFERENCES groups(pubid),
    userid  TEXT NOT NULL,
    PRIMARY KEY (pubid, userid)
);

-- Annotations are soft-deleted; no DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS annotations (
    id          TEXT PRIMARY KEY,
    userid      TEXT NOT NULL,
    groupid     TEXT NOT NULL,
    shared      INTEGER NOT NULL,
    deleted     INTEGER NOT NULL DEFAULT 0,
    target_uri  TEXT NOT NULL,
    text        TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- One row per hidden annotation.
CREATE TABLE IF NOT EXISTS annotation_moderation (
    annotation_id TEXT PRIMARY KEY REFERENCES annotations(id),
    hidden_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tokens (
    token_hash  TEXT PRIMARY KEY,   -- hex SHA-256 of the bearer token
    userid      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS annotations_group_idx ON annotations(groupid);
CREATE INDEX IF NOT EXISTS members_user_idx      ON group_members(userid);

INSERT OR IGNORE INTO organizations (pubid, name, authority, logo, created_at)
VALUES ('__default__', 'Margin', 'localhost', NULL, '1970-01-01T00:00:00+00:00');

INSERT OR IGNORE INTO groups (pubid, name, authority, creator, organization, readable_by, created_at)
VALUES ('__world__', 'Public', 'localhost', NULL, '__default__', 'world', '1970-01-01T00:00:00+00:00');

PRAGMA user_version = 1;
";
