//! Schema versioning for the slot database.
//!
//! The `metadata` table records which entries of [`MIGRATIONS`] have been
//! applied; opening a database applies the rest in order.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::{MIGRATIONS, SCHEMA_STATEMENTS};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// The schema version a fully migrated database reports.
#[must_use]
pub fn current_version() -> i32 {
    i32::try_from(MIGRATIONS.len()).unwrap_or(i32::MAX)
}

/// Create the base tables and apply pending migrations.
///
/// # Errors
///
/// Returns an error if a statement fails or the stored version is unreadable.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = schema_version(conn)?;
    let target = current_version();
    if version > target {
        return Err(Error::DatabaseMigration {
            message: format!("database schema v{version} is newer than supported v{target}"),
        });
    }

    for next in (version + 1)..=target {
        apply(conn, next)?;
    }
    Ok(())
}

/// Read the schema version. A database without one is at version 0.
fn schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Apply the migration that brings the schema to `version`.
fn apply(conn: &Connection, version: i32) -> Result<()> {
    let statement = usize::try_from(version - 1)
        .ok()
        .and_then(|idx| MIGRATIONS.get(idx))
        .ok_or_else(|| Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        })?;

    debug!("Applying schema migration v{}", version);
    conn.execute_batch(statement)?;
    set_schema_version(conn, version)
}
