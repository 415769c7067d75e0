#![forbid(unsafe_code)]
//! blipseed-core library.
//!
//! Synthesises a directed "follows" graph over a pool of synthetic identities
//! and reports statistics about it. The pipeline runs in six stages:
//!
//! 1. [`identity`]: materialise the identity pool and persist each identity.
//! 2. [`degree`]: draw a heavy-tailed target out-degree per identity.
//! 3. [`selector`]: attach out-edges by attribute-weighted streaming selection.
//! 4. [`closure`]: close triads (friends of friends).
//! 5. [`reciprocity`]: mirror a fraction of the existing edges.
//! 6. [`stats`]: aggregate and distributional metrics, then edge persistence.
//!
//! [`seeder::GraphSeeder`] drives the stages for one request.
//!
//! # Conventions
//!
//! - **Errors**: Library failures are [`SeedError`]; glue code uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod campaign;
pub mod catalog;
pub mod closure;
pub mod config;
pub mod degree;
pub mod error;
pub mod graph;
pub mod identity;
pub mod memory;
pub mod oracle;
pub mod reciprocity;
pub mod request;
pub mod rng;
pub mod seeder;
pub mod selector;
pub mod stats;
pub mod store;

pub use error::{ErrorCode, SeedError};
pub use request::{GraphSeedRequest, GraphSeedResult, GraphSeedStats, TopHub};
pub use seeder::{GeneratedGraph, GraphSeeder};
pub use store::{CancellationToken, EdgeStore, IdentityStore};
