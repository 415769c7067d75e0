//! In-memory store for dry runs, campaigns, and tests.
//!
//! Reports fixed charges per call and can be told to fail specific calls so
//! error paths can be exercised without a database.

use std::collections::BTreeSet;

use crate::identity::Identity;
use crate::store::{Charged, EdgeStore, IdentityStore, PersistedIdentity, StoreError};

/// Records every write; never touches disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    identity_charge: f64,
    edge_charge: f64,
    identities: Vec<PersistedIdentity>,
    edges: Vec<(String, String)>,
    fail_identity_at: Option<usize>,
    fail_edges_at: BTreeSet<usize>,
    edge_calls: usize,
}

impl MemoryStore {
    /// Store that reports `identity_charge` per identity and `edge_charge`
    /// per edge.
    #[must_use]
    pub fn with_charges(identity_charge: f64, edge_charge: f64) -> Self {
        Self {
            identity_charge,
            edge_charge,
            ..Self::default()
        }
    }

    /// Fail the identity write with this zero-based call index.
    #[must_use]
    pub fn fail_identity_at(mut self, call: usize) -> Self {
        self.fail_identity_at = Some(call);
        self
    }

    /// Fail the edge writes with these zero-based call indexes.
    #[must_use]
    pub fn fail_edges_at(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.fail_edges_at.extend(calls);
        self
    }

    /// Identities written so far.
    #[must_use]
    pub fn identities(&self) -> &[PersistedIdentity] {
        &self.identities
    }

    /// Edges written so far as `(source_id, target_id)`.
    #[must_use]
    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    /// Number of edge writes attempted, failed ones included.
    #[must_use]
    pub const fn edge_calls(&self) -> usize {
        self.edge_calls
    }
}

impl IdentityStore for MemoryStore {
    fn create_identity(&mut self, identity: &Identity) -> Result<Charged<PersistedIdentity>, StoreError> {
        if self.fail_identity_at == Some(self.identities.len()) {
            return Err(format!("identity store rejected {}", identity.name).into());
        }

        let persisted = PersistedIdentity {
            external_id: identity.name.clone(),
            account_id: format!("acct-{:04}", identity.index),
        };
        self.identities.push(persisted.clone());
        Ok(Charged::new(persisted, self.identity_charge))
    }
}

impl EdgeStore for MemoryStore {
    fn create_edge(&mut self, source_id: &str, target_id: &str) -> Result<f64, StoreError> {
        let call = self.edge_calls;
        self.edge_calls += 1;
        if self.fail_edges_at.contains(&call) {
            return Err(format!("edge store rejected {source_id} -> {target_id}").into());
        }

        self.edges.push((source_id.to_string(), target_id.to_string()));
        Ok(self.edge_charge)
    }
}
