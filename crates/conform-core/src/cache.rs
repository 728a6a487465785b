//! Memoization of verification outcomes
//!
//! Every declared type carries a SHA-256 digest of everything a verification
//! reads from it: its name, ancestor chain and resolved member table. The
//! digest is computed once by [`TypeRegistry::declare`], so a lookup costs two
//! index lookups and a map access. A changed declaration produces a new
//! digest instead of a stale hit, and one cache can be shared by several
//! registries.
//!
//! The cache holds at most `capacity` entries and evicts the oldest first.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::classify::{self, ClassifiedMember};
use crate::config::VerifyOptions;
use crate::hierarchy::TypeRegistry;
use crate::verifier::{self, VerificationResult};
use crate::Result;

/// Entries kept by [`VerificationCache::new`]
pub const DEFAULT_CAPACITY: usize = 4096;

#[derive(Serialize)]
struct TypeShape<'a> {
    name: &'a str,
    ancestors: &'a [String],
    contract: bool,
    members: Vec<ClassifiedMember>,
}

/// SHA-256 over the canonical JSON of a declared type's shape
pub(crate) fn shape_digest(registry: &TypeRegistry, name: &str) -> Result<String> {
    let shape = TypeShape {
        name,
        ancestors: registry.ancestors(name)?,
        contract: registry.is_contract(name),
        members: classify::members(registry, name)?.into_values().collect(),
    };
    // Serializing plain data structs into a Vec cannot fail
    let canonical = serde_json::to_vec(&shape).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Cache key: both shape digests and the only option that changes the outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub contract: String,
    pub candidate: String,
    pub check_annotations: bool,
}

/// Key for a (contract, candidate, options) triple
pub fn fingerprint(
    registry: &TypeRegistry,
    contract: &str,
    candidate: &str,
    options: &VerifyOptions,
) -> Result<Fingerprint> {
    Ok(Fingerprint {
        contract: registry.digest(contract)?.to_string(),
        candidate: registry.digest(candidate)?.to_string(),
        check_annotations: options.check_annotations,
    })
}

#[derive(Debug, Default)]
struct Entries {
    outcomes: HashMap<Fingerprint, Result<VerificationResult>>,
    order: VecDeque<Fingerprint>,
}

/// Thread-safe, bounded memo of verification outcomes
#[derive(Debug)]
pub struct VerificationCache {
    entries: RwLock<Entries>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for VerificationCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl VerificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` outcomes (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        VerificationCache {
            entries: RwLock::new(Entries::default()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the memoized outcome for the pair, verifying on first use
    ///
    /// With `options.cache` off this is a plain call to [`verifier::verify`].
    pub fn get_or_verify(
        &self,
        registry: &TypeRegistry,
        contract: &str,
        candidate: &str,
        options: &VerifyOptions,
    ) -> Result<VerificationResult> {
        if !options.cache {
            return verifier::verify(registry, contract, candidate, options);
        }

        let key = match fingerprint(registry, contract, candidate, options) {
            Ok(key) => key,
            // Unknown names: nothing to key on, and nothing worth storing
            Err(_) => return verifier::verify(registry, contract, candidate, options),
        };
        if let Some(outcome) = self.entries.read().outcomes.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(contract, candidate, "cache hit");
            return outcome.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let outcome = verifier::verify(registry, contract, candidate, options);
        self.store(key, outcome.clone());
        outcome
    }

    fn store(&self, key: Fingerprint, outcome: Result<VerificationResult>) {
        let mut entries = self.entries.write();
        if entries.outcomes.contains_key(&key) {
            return;
        }
        while entries.outcomes.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.outcomes.remove(&oldest);
            trace!("cache eviction");
        }
        entries.order.push_back(key.clone());
        entries.outcomes.insert(key, outcome);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.read().outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.outcomes.clear();
        entries.order.clear();
    }
}
