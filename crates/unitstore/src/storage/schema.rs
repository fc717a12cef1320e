//! `SQLite` schema definitions for the slot store.

/// SQL statement to create the slots table.
///
/// Each row is one named storage slot holding a JSON document.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Base schema statements, applied before migrations.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_METADATA_TABLE];

/// Migration steps, indexed by target version minus one.
pub const MIGRATIONS: &[&str] = &[CREATE_SLOTS_TABLE];
