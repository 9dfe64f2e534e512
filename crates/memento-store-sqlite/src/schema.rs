//! SQL schema for the Memento SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS resources (
    resource_id TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL         -- YYYYMMDDHHMMSS, UTC
);

-- Versions are append-only. Timestamps use the compact 14-digit form so
-- that text order is chronological order.
CREATE TABLE IF NOT EXISTS versions (
    version_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id TEXT NOT NULL REFERENCES resources(resource_id),
    timestamp   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS versions_resource_ts_idx
    ON versions(resource_id, timestamp);

PRAGMA user_version = 1;
";
