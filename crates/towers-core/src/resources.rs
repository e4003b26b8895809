//! # Resource Manager (RAM)
//!
//! A named-allocation budget ledger.
//!
//! The ledger has no knowledge of processes; the scheduler uses process ids
//! as keys. Allocation beyond the remaining capacity is refused, and
//! allocating twice under the same key is a scheduler bug.

use crate::primitives::DEFAULT_RAM_CAPACITY;
use std::collections::BTreeMap;

/// Fixed-capacity allocation ledger.
///
/// Invariant: `used() == sum(allocations) <= capacity()`.
#[derive(Debug, Clone)]
pub struct ResourceManager<K: Ord = String> {
    capacity: u64,
    used: u64,
    allocations: BTreeMap<K, u64>,
}

impl<K: Ord> Default for ResourceManager<K> {
    fn default() -> Self {
        Self::new(DEFAULT_RAM_CAPACITY)
    }
}

impl<K: Ord> ResourceManager<K> {
    /// Create a ledger with the given capacity.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            used: 0,
            allocations: BTreeMap::new(),
        }
    }

    /// Reserve `amount` under `key`.
    ///
    /// Returns `false` (and changes nothing) if `amount` exceeds the
    /// remaining capacity.
    ///
    /// # Panics
    ///
    /// Panics if `key` already holds an allocation: the caller lost track
    /// of what it allocated.
    pub fn allocate(&mut self, key: K, amount: u64) -> bool {
        assert!(
            !self.allocations.contains_key(&key),
            "double allocation under the same key"
        );
        if amount > self.remaining() {
            return false;
        }
        self.used = self.used.saturating_add(amount);
        self.allocations.insert(key, amount);
        true
    }

    /// Release the allocation held under `key`. Unknown keys are ignored.
    pub fn deallocate(&mut self, key: &K) {
        if let Some(amount) = self.allocations.remove(key) {
            self.used = self.used.saturating_sub(amount);
        }
    }

    /// Capacity minus current allocations.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.used)
    }

    /// Sum of current allocations.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Total capacity.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Amount held under `key`, if any.
    #[must_use]
    pub fn allocation(&self, key: &K) -> Option<u64> {
        self.allocations.get(key).copied()
    }

    /// Iterate over current allocations in key order.
    pub fn allocations(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.allocations.iter().map(|(k, v)| (k, *v))
    }
}

// =============================================================================
// TESTS
// =============================================================================
