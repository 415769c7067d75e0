//! Identity pool: the population every edge is drawn over.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::catalog::{INFLUENCER_RATE, INTERESTS, USERNAMES};
use crate::error::SeedError;
use crate::rng::RunRng;
use crate::store::{CancellationToken, IdentityStore};

/// One synthetic user. Immutable once the pool is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Position in the pool, stable for the run.
    pub index: usize,
    /// Catalogue name; also the id the store is asked to use.
    pub name: String,
    /// Two distinct interest tags.
    pub interests: [&'static str; 2],
    pub is_influencer: bool,
    pub is_bot: bool,
}

impl Identity {
    /// Whether the two identities share at least one interest tag.
    #[must_use]
    pub fn shares_interest(&self, other: &Self) -> bool {
        self.interests.iter().any(|tag| other.interests.contains(tag))
    }
}

/// Attribute probabilities for pool construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolRates {
    pub influencer: f64,
    pub bot: f64,
}

impl Default for PoolRates {
    fn default() -> Self {
        Self {
            influencer: INFLUENCER_RATE,
            bot: crate::catalog::DEFAULT_BOT_RATE,
        }
    }
}

/// The identities of one run plus the ids the store assigned them.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityPool {
    identities: Vec<Identity>,
    external_ids: Vec<String>,
    charge: f64,
}

impl IdentityPool {
    /// Materialise `users` identities from the catalogue and persist each
    /// one, in catalogue order.
    ///
    /// `users` must already be clamped to the catalogue size.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::IdentityPersistence`] on the first store failure
    /// and [`SeedError::Cancelled`] if `cancel` fires before the pool is
    /// complete. Either way no pool is returned.
    #[instrument(skip(rng, store, cancel))]
    pub fn build<S: IdentityStore + ?Sized>(
        users: usize,
        rates: PoolRates,
        rng: &mut RunRng,
        store: &mut S,
        cancel: &CancellationToken,
    ) -> Result<Self, SeedError> {
        let mut identities = Vec::with_capacity(users);
        let mut external_ids = Vec::with_capacity(users);
        let mut charge = 0.0;

        for (index, name) in USERNAMES.iter().take(users).enumerate() {
            if cancel.is_cancelled() {
                return Err(SeedError::Cancelled {
                    persisted: index,
                    requested: users,
                });
            }

            let identity = draw_identity(index, name, rates, rng);
            let persisted = store.create_identity(&identity).map_err(|source| {
                SeedError::IdentityPersistence {
                    external_id: identity.name.clone(),
                    source,
                }
            })?;

            charge += persisted.charge;
            external_ids.push(persisted.value.external_id);
            identities.push(identity);
        }

        debug!(users = identities.len(), charge, "identity pool built");
        Ok(Self {
            identities,
            external_ids,
            charge,
        })
    }

    /// Build a pool from already-known identities without touching a store.
    #[must_use]
    pub fn from_parts(identities: Vec<Identity>, external_ids: Vec<String>) -> Self {
        Self {
            identities,
            external_ids,
            charge: 0.0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &Identity {
        &self.identities[index]
    }

    #[must_use]
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Store-assigned ids, indexed like the identities.
    #[must_use]
    pub fn external_ids(&self) -> &[String] {
        &self.external_ids
    }

    /// Total charge reported while persisting the pool.
    #[must_use]
    pub const fn charge(&self) -> f64 {
        self.charge
    }
}

fn draw_identity(index: usize, name: &str, rates: PoolRates, rng: &mut RunRng) -> Identity {
    let first = INTERESTS[rng.next_index(INTERESTS.len())];
    let mut second = INTERESTS[rng.next_index(INTERESTS.len())];
    while second == first {
        second = INTERESTS[rng.next_index(INTERESTS.len())];
    }

    Identity {
        index,
        name: name.to_string(),
        interests: [first, second],
        is_influencer: rng.chance(rates.influencer),
        is_bot: rng.chance(rates.bot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn build_takes_catalogue_prefix_in_order() {
        let mut rng = RunRng::new(Some(5));
        let mut store = MemoryStore::with_charges(1.5, 0.0);
        let pool = IdentityPool::build(
            4,
            PoolRates::default(),
            &mut rng,
            &mut store,
            &CancellationToken::new(),
        )
        .expect("pool builds");

        assert_eq!(pool.len(), 4);
        assert_eq!(pool.external_ids(), &["acorn", "alpenglow", "amber", "ash"]);
        for (i, identity) in pool.identities().iter().enumerate() {
            assert_eq!(identity.index, i);
            assert_ne!(identity.interests[0], identity.interests[1]);
            assert!(!identity.is_bot);
        }
        assert!((pool.charge() - 6.0).abs() < 1e-12);
        assert_eq!(store.identities().len(), 4);
    }

    #[test]
    fn bot_and_influencer_rates_are_honoured_at_extremes() {
        let mut rng = RunRng::new(Some(5));
        let mut store = MemoryStore::default();
        let pool = IdentityPool::build(
            20,
            PoolRates {
                influencer: 1.0,
                bot: 1.0,
            },
            &mut rng,
            &mut store,
            &CancellationToken::new(),
        )
        .expect("pool builds");
        assert!(pool.identities().iter().all(|i| i.is_bot && i.is_influencer));
    }

    #[test]
    fn store_failure_aborts_and_names_identity() {
        let mut rng = RunRng::new(Some(5));
        let mut store = MemoryStore::default().fail_identity_at(2);
        let err = IdentityPool::build(
            5,
            PoolRates::default(),
            &mut rng,
            &mut store,
            &CancellationToken::new(),
        )
        .expect_err("third identity fails");

        match err {
            SeedError::IdentityPersistence { external_id, .. } => {
                assert_eq!(external_id, "amber");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.identities().len(), 2);
    }

    #[test]
    fn cancelled_token_stops_before_first_write() {
        let mut rng = RunRng::new(Some(5));
        let mut store = MemoryStore::default();
        let token = CancellationToken::new();
        token.cancel();
        let err = IdentityPool::build(5, PoolRates::default(), &mut rng, &mut store, &token)
            .expect_err("cancelled");
        assert!(matches!(
            err,
            SeedError::Cancelled {
                persisted: 0,
                requested: 5
            }
        ));
        assert!(store.identities().is_empty());
    }

    #[test]
    fn shares_interest_is_symmetric() {
        let a = Identity {
            index: 0,
            name: "a".to_string(),
            interests: ["tech", "art"],
            is_influencer: false,
            is_bot: false,
        };
        let b = Identity {
            index: 1,
            name: "b".to_string(),
            interests: ["food", "art"],
            is_influencer: false,
            is_bot: false,
        };
        let c = Identity {
            index: 2,
            name: "c".to_string(),
            interests: ["food", "music"],
            is_influencer: false,
            is_bot: false,
        };
        assert!(a.shares_interest(&b));
        assert!(b.shares_interest(&a));
        assert!(!a.shares_interest(&c));
    }
}
