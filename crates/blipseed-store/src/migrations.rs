//! Schema upgrades for the seed store.
//!
//! The store records how far its schema has been upgraded in SQLite's
//! `user_version` header field. Opening a store runs every step above that
//! number, each inside its own transaction, so a crash mid-upgrade leaves the
//! database at the last completed step. A database stamped by a newer
//! binary is refused rather than written with an older schema.

use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::debug;

use crate::schema;

/// One upgrade step: the schema version it produces and the DDL to get there.
struct Step {
    version: u32,
    what: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        what: "accounts, persons and follows tables",
        sql: schema::MIGRATION_V1_SQL,
    },
    Step {
        version: 2,
        what: "follower and account lookup indexes",
        sql: schema::MIGRATION_V2_SQL,
    },
];

/// Schema version written by this build.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

/// Schema version stamped on the open database. Zero means a fresh file.
///
/// # Errors
///
/// Returns an error if the header cannot be read or holds a negative value.
pub fn current_schema_version(conn: &Connection) -> Result<u32> {
    let stamped: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(u32::try_from(stamped)?)
}

/// Bring the store schema up to [`LATEST_SCHEMA_VERSION`] and return it.
///
/// # Errors
///
/// Returns an error if the database was stamped by a newer build or a step
/// fails. Steps that committed before the failure stay applied.
pub fn migrate(conn: &mut Connection) -> Result<u32> {
    let mut version = current_schema_version(conn)?;
    if version > LATEST_SCHEMA_VERSION {
        bail!(
            "store schema v{version} is newer than this build supports (v{LATEST_SCHEMA_VERSION})"
        );
    }

    for step in STEPS.iter().filter(move |step| step.version > version) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", i64::from(step.version))?;
        tx.commit()?;
        debug!(version = step.version, what = step.what, "store schema upgraded");
        version = step.version;
    }

    Ok(version)
}
