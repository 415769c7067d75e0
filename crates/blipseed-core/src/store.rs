//! Persistence seams consumed by the generator.
//!
//! The generator only needs two effectful operations: persist an identity and
//! persist a follow edge. Each reports a numeric charge (request units, rows,
//! whatever the backing store meters) that the run accumulates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::graph::DirectedEdge;
use crate::identity::Identity;

/// Error type returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A stored value together with the charge the store reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Charged<T> {
    pub value: T,
    pub charge: f64,
}

impl<T> Charged<T> {
    #[must_use]
    pub const fn new(value: T, charge: f64) -> Self {
        Self { value, charge }
    }
}

/// Identity as the store knows it after persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedIdentity {
    /// Identifier used for follow edges and in reports.
    pub external_id: String,
    /// Account record created alongside the person.
    pub account_id: String,
}

/// Creates identities (account + person) in the backing store.
pub trait IdentityStore {
    /// Persist one identity.
    ///
    /// # Errors
    ///
    /// Any error aborts the seed run.
    fn create_identity(&mut self, identity: &Identity) -> Result<Charged<PersistedIdentity>, StoreError>;
}

/// Creates follow edges in the backing store.
pub trait EdgeStore {
    /// Persist `source_id follows target_id` and return its charge.
    ///
    /// # Errors
    ///
    /// Errors are recorded per edge; the run keeps going.
    fn create_edge(&mut self, source_id: &str, target_id: &str) -> Result<f64, StoreError>;
}

impl<T: IdentityStore + ?Sized> IdentityStore for &mut T {
    fn create_identity(&mut self, identity: &Identity) -> Result<Charged<PersistedIdentity>, StoreError> {
        (**self).create_identity(identity)
    }
}

impl<T: EdgeStore + ?Sized> EdgeStore for &mut T {
    fn create_edge(&mut self, source_id: &str, target_id: &str) -> Result<f64, StoreError> {
        (**self).create_edge(source_id, target_id)
    }
}

/// Cooperative cancellation flag shared between a run and its caller.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A follow edge the store refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeFailure {
    pub source: String,
    pub target: String,
    pub reason: String,
}

/// Result of writing the edge list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePersistOutcome {
    pub charge: f64,
    pub persisted: usize,
    pub failures: Vec<EdgeFailure>,
    pub cancelled: bool,
}

/// Write every edge, in order, one call at a time.
///
/// A failed edge is logged and recorded; the remaining edges are still
/// attempted. Once `cancel` fires no further writes are issued and the
/// charge accumulated so far is returned.
pub fn persist_edges<S: EdgeStore + ?Sized>(
    store: &mut S,
    external_ids: &[String],
    edges: &[DirectedEdge],
    cancel: &CancellationToken,
) -> EdgePersistOutcome {
    let mut outcome = EdgePersistOutcome::default();

    for (position, edge) in edges.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                written = position,
                remaining = edges.len() - position,
                "edge persistence cancelled; graph only partially stored"
            );
            outcome.cancelled = true;
            break;
        }

        let source = &external_ids[edge.source];
        let target = &external_ids[edge.target];
        match store.create_edge(source, target) {
            Ok(charge) => {
                outcome.charge += charge;
                outcome.persisted += 1;
            }
            Err(err) => {
                warn!(
                    code = %ErrorCode::EdgePersistFailed,
                    %source,
                    %target,
                    error = %err,
                    "follow edge not persisted"
                );
                outcome.failures.push(EdgeFailure {
                    source: source.clone(),
                    target: target.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        persisted = outcome.persisted,
        failed = outcome.failures.len(),
        charge = outcome.charge,
        "edge persistence finished"
    );
    outcome
}
