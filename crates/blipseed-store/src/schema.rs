//! SQLite schema for persisted seed runs.
//!
//! - `accounts` holds one login account per synthetic user
//! - `persons` holds the graph vertex, keyed by the external id used in
//!   follow edges, plus the attributes the generator drew for it
//! - `follows` holds directed edges; the rowid keeps insertion order

/// Migration v1: accounts, persons, follows.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    account_id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (account_id LIKE 'acct-%')
);

CREATE TABLE IF NOT EXISTS persons (
    person_id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    interests TEXT NOT NULL,
    is_influencer INTEGER NOT NULL DEFAULT 0 CHECK (is_influencer IN (0, 1)),
    is_bot INTEGER NOT NULL DEFAULT 0 CHECK (is_bot IN (0, 1)),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS follows (
    source_id TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    target_id TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (source_id, target_id),
    CHECK (source_id <> target_id)
);
";

/// Migration v2: lookup indexes for follower counts and account joins.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_follows_target
    ON follows(target_id);

CREATE INDEX IF NOT EXISTS idx_persons_account
    ON persons(account_id);
";

/// Indexes every migrated database must have.
pub const REQUIRED_INDEXES: &[&str] = &["idx_follows_target", "idx_persons_account"];
