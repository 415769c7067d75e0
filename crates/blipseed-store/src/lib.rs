#![forbid(unsafe_code)]
//! SQLite persistence for blipseed runs.
//!
//! Runtime defaults match every other SQLite database in the workspace:
//! - `journal_mode = WAL`
//! - `busy_timeout = 5s`
//! - `foreign_keys = ON`, so a follow edge naming an unknown person fails

pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use blipseed_core::catalog::email_for;
use blipseed_core::config::StoreConfig;
use blipseed_core::graph::{DirectedEdge, FollowGraph};
use blipseed_core::identity::Identity;
use blipseed_core::store::{Charged, EdgeStore, IdentityStore, PersistedIdentity, StoreError};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Charge reported per row written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreCharges {
    pub account: f64,
    pub person: f64,
    pub follow: f64,
}

impl Default for StoreCharges {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for StoreCharges {
    fn from(config: &StoreConfig) -> Self {
        Self {
            account: config.account_charge,
            person: config.person_charge,
            follow: config.follow_charge,
        }
    }
}

/// Row counts of the store's tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub accounts: usize,
    pub persons: usize,
    pub follows: usize,
}

/// A follow graph read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGraph {
    /// Person ids in insertion order; index `i` is node `i` of `graph`.
    pub external_ids: Vec<String>,
    pub graph: FollowGraph,
    pub influencers: usize,
    pub bots: usize,
}

/// Identity and follow-edge store over one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    charges: StoreCharges,
}

/// Open (or create) the store database, apply runtime pragmas, and migrate
/// the schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening, configuring, or migrating the database fails.
pub fn open_store(path: &Path, charges: StoreCharges) -> Result<SqliteStore> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let conn =
        Connection::open(path).with_context(|| format!("open store database {}", path.display()))?;
    SqliteStore::from_connection(conn, charges)
}

/// In-memory store, mainly for tests.
///
/// # Errors
///
/// Returns an error if SQLite cannot allocate the database or migrate it.
pub fn open_in_memory(charges: StoreCharges) -> Result<SqliteStore> {
    let conn = Connection::open_in_memory().context("open in-memory store")?;
    SqliteStore::from_connection(conn, charges)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

/// `acct-` followed by the first 16 hex digits of the name's blake3 hash.
#[must_use]
pub fn account_id_for(name: &str) -> String {
    let hash = blake3::hash(name.as_bytes()).to_hex();
    format!("acct-{}", &hash.as_str()[..16])
}

impl SqliteStore {
    fn from_connection(mut conn: Connection, charges: StoreCharges) -> Result<Self> {
        configure_connection(&conn).context("configure sqlite pragmas")?;
        let version = migrations::migrate(&mut conn).context("apply store migrations")?;
        debug!(version, "store ready");
        Ok(Self { conn, charges })
    }

    /// Underlying connection, for ad-hoc queries.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub const fn charges(&self) -> StoreCharges {
        self.charges
    }

    /// Delete every follow, person, and account.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete transaction fails.
    pub fn reset(&mut self) -> Result<StoreCounts> {
        let before = self.counts()?;
        let tx = self.conn.transaction().context("begin reset")?;
        tx.execute_batch(
            "DELETE FROM follows;
             DELETE FROM persons;
             DELETE FROM accounts;",
        )
        .context("clear store tables")?;
        tx.commit().context("commit reset")?;
        debug!(
            accounts = before.accounts,
            persons = before.persons,
            follows = before.follows,
            "store reset"
        );
        Ok(before)
    }

    /// Count rows in each table.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails.
    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .with_context(|| format!("count {table}"))?;
            usize::try_from(n).with_context(|| format!("negative row count for {table}"))
        };
        Ok(StoreCounts {
            accounts: count("accounts")?,
            persons: count("persons")?,
            follows: count("follows")?,
        })
    }

    /// Account id recorded for `person_id`, if the person exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn account_of(&self, person_id: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT account_id FROM persons WHERE person_id = ?1",
                [person_id],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("look up account of {person_id}"))
    }

    /// Read persons and follows back, both in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn load_graph(&self) -> Result<StoredGraph> {
        let mut stmt = self
            .conn
            .prepare("SELECT person_id, is_influencer, is_bot FROM persons ORDER BY rowid")
            .context("prepare person query")?;
        let persons = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })
            .context("query persons")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read persons")?;

        let index: HashMap<&str, usize> = persons
            .iter()
            .enumerate()
            .map(|(i, (id, _, _))| (id.as_str(), i))
            .collect();

        let mut stmt = self
            .conn
            .prepare("SELECT source_id, target_id FROM follows ORDER BY rowid")
            .context("prepare follow query")?;
        let follows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .context("query follows")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read follows")?;

        let edges = follows.iter().filter_map(|(source, target)| {
            Some(DirectedEdge::new(
                *index.get(source.as_str())?,
                *index.get(target.as_str())?,
            ))
        });
        let graph = FollowGraph::from_edges(persons.len(), edges);

        Ok(StoredGraph {
            influencers: persons.iter().filter(|(_, inf, _)| *inf).count(),
            bots: persons.iter().filter(|(_, _, bot)| *bot).count(),
            external_ids: persons.into_iter().map(|(id, _, _)| id).collect(),
            graph,
        })
    }
}

impl IdentityStore for SqliteStore {
    fn create_identity(&mut self, identity: &Identity) -> Result<Charged<PersistedIdentity>, StoreError> {
        let now = chrono::Utc::now().timestamp_micros();
        let email = email_for(&identity.name);
        let account_id = account_id_for(&identity.name);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO accounts (account_id, name, email, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(account_id) DO UPDATE SET updated_at_us = excluded.updated_at_us",
            params![account_id, identity.name, email, now],
        )?;
        tx.execute(
            "INSERT INTO persons (person_id, account_id, name, email, interests,
                                  is_influencer, is_bot, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(person_id) DO UPDATE SET
                account_id = excluded.account_id,
                interests = excluded.interests,
                is_influencer = excluded.is_influencer,
                is_bot = excluded.is_bot,
                updated_at_us = excluded.updated_at_us",
            params![
                identity.name,
                account_id,
                identity.name,
                email,
                identity.interests.join(","),
                identity.is_influencer,
                identity.is_bot,
                now,
            ],
        )?;
        tx.commit()?;

        Ok(Charged::new(
            PersistedIdentity {
                external_id: identity.name.clone(),
                account_id,
            },
            self.charges.account + self.charges.person,
        ))
    }
}

impl EdgeStore for SqliteStore {
    fn create_edge(&mut self, source_id: &str, target_id: &str) -> Result<f64, StoreError> {
        let now = chrono::Utc::now().timestamp_micros();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO follows (source_id, target_id, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![source_id, target_id, now],
        )?;
        Ok(if inserted == 1 { self.charges.follow } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity(index: usize, name: &str, influencer: bool) -> Identity {
        Identity {
            index,
            name: name.to_string(),
            interests: ["tech", "music"],
            is_influencer: influencer,
            is_bot: false,
        }
    }

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested/blipseed.sqlite3");
        (dir, path)
    }

    #[test]
    fn open_store_sets_wal_busy_timeout_and_fk() {
        let (_dir, path) = temp_db_path();
        let store = open_store(&path, StoreCharges::default()).expect("open store");
        let conn = store.connection();

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(u128::from(busy_timeout_ms), DEFAULT_BUSY_TIMEOUT.as_millis());

        let foreign_keys: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("query foreign_keys");
        assert_eq!(foreign_keys, 1);

        let version = migrations::current_schema_version(conn).expect("schema version");
        assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn identity_writes_account_and_person() {
        let mut store = open_in_memory(StoreCharges {
            account: 1.0,
            person: 5.0,
            follow: 5.0,
        })
        .expect("open store");

        let charged = store
            .create_identity(&identity(0, "acorn", true))
            .expect("persist identity");
        assert!((charged.charge - 6.0).abs() < f64::EPSILON);
        assert_eq!(charged.value.external_id, "acorn");
        assert_eq!(charged.value.account_id, account_id_for("acorn"));
        assert_eq!(
            store.account_of("acorn").expect("lookup"),
            Some(account_id_for("acorn"))
        );

        let counts = store.counts().expect("counts");
        assert_eq!(
            counts,
            StoreCounts {
                accounts: 1,
                persons: 1,
                follows: 0
            }
        );
    }

    #[test]
    fn identity_upsert_is_idempotent() {
        let mut store = open_in_memory(StoreCharges::default()).expect("open store");
        store.create_identity(&identity(0, "acorn", false)).expect("first");
        store.create_identity(&identity(0, "acorn", true)).expect("second");

        let counts = store.counts().expect("counts");
        assert_eq!(counts.accounts, 1);
        assert_eq!(counts.persons, 1);
        assert_eq!(store.load_graph().expect("load").influencers, 1);
    }

    #[test]
    fn duplicate_follow_is_ignored_and_free() {
        let mut store = open_in_memory(StoreCharges::default()).expect("open store");
        store.create_identity(&identity(0, "acorn", false)).expect("acorn");
        store.create_identity(&identity(1, "amber", false)).expect("amber");

        let first = store.create_edge("acorn", "amber").expect("first follow");
        let second = store.create_edge("acorn", "amber").expect("second follow");
        assert!((first - 5.0).abs() < f64::EPSILON);
        assert!(second.abs() < f64::EPSILON);
        assert_eq!(store.counts().expect("counts").follows, 1);
    }

    #[test]
    fn follow_to_unknown_person_fails() {
        let mut store = open_in_memory(StoreCharges::default()).expect("open store");
        store.create_identity(&identity(0, "acorn", false)).expect("acorn");
        let err = store.create_edge("acorn", "ghost").expect_err("foreign key");
        assert!(err.to_string().to_ascii_lowercase().contains("foreign key"));
        assert_eq!(store.counts().expect("counts").follows, 0);
    }

    #[test]
    fn load_graph_preserves_insertion_order() {
        let mut store = open_in_memory(StoreCharges::default()).expect("open store");
        for (i, name) in ["zinnia", "acorn", "moss"].iter().enumerate() {
            store.create_identity(&identity(i, name, false)).expect("identity");
        }
        store.create_edge("moss", "zinnia").expect("edge");
        store.create_edge("zinnia", "acorn").expect("edge");
        store.create_edge("acorn", "zinnia").expect("edge");

        let stored = store.load_graph().expect("load");
        assert_eq!(stored.external_ids, vec!["zinnia", "acorn", "moss"]);
        assert_eq!(
            stored.graph.edges(),
            &[
                DirectedEdge::new(2, 0),
                DirectedEdge::new(0, 1),
                DirectedEdge::new(1, 0),
            ]
        );
        assert_eq!(stored.graph.in_degree(0), 2);
    }

    #[test]
    fn reset_clears_every_table() {
        let mut store = open_in_memory(StoreCharges::default()).expect("open store");
        store.create_identity(&identity(0, "acorn", false)).expect("acorn");
        store.create_identity(&identity(1, "amber", false)).expect("amber");
        store.create_edge("acorn", "amber").expect("edge");

        let before = store.reset().expect("reset");
        assert_eq!(before.follows, 1);
        assert_eq!(store.counts().expect("counts"), StoreCounts::default());
    }

    #[test]
    fn account_ids_are_stable_and_prefixed() {
        assert_eq!(account_id_for("acorn"), account_id_for("acorn"));
        assert_ne!(account_id_for("acorn"), account_id_for("amber"));
        assert!(account_id_for("acorn").starts_with("acct-"));
        assert_eq!(account_id_for("acorn").len(), 21);
    }
}
