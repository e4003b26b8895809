//! # Priority Queue
//!
//! Stable max-priority queue used by the scheduler for processes that are
//! waiting for a core.
//!
//! Items are grouped into one FIFO bucket per distinct priority. The
//! highest non-empty bucket is served first and, within a bucket, items
//! leave in arrival order.

use std::collections::{BTreeMap, VecDeque};

/// A stable max-priority queue.
///
/// Uses `BTreeMap` keyed by priority so the highest bucket is always the
/// last key. Empty buckets are removed immediately.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    buckets: BTreeMap<i64, VecDeque<T>>,
    len: usize,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item behind every item already queued at `priority`.
    pub fn add_item(&mut self, item: T, priority: i64) {
        self.buckets.entry(priority).or_default().push_back(item);
        self.len = self.len.saturating_add(1);
    }

    /// Front item of the highest-priority bucket.
    #[must_use]
    pub fn peek_next(&self) -> Option<&T> {
        self.buckets
            .last_key_value()
            .and_then(|(_, bucket)| bucket.front())
    }

    /// Priority of the item `peek_next` would return.
    #[must_use]
    pub fn peek_priority(&self) -> Option<i64> {
        self.buckets.last_key_value().map(|(priority, _)| *priority)
    }

    /// Remove and return the front item of the highest-priority bucket.
    pub fn extract_next(&mut self) -> Option<T> {
        let mut entry = self.buckets.last_entry()?;
        let item = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        if item.is_some() {
            self.len = self.len.saturating_sub(1);
        }
        item
    }

    /// Remove the first item (in extraction order) matching `pred`.
    ///
    /// This is a linear scan over every queued item.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let mut found = None;
        for (priority, bucket) in self.buckets.iter_mut().rev() {
            if let Some(pos) = bucket.iter().position(&mut pred) {
                found = Some((*priority, pos));
                break;
            }
        }

        let (priority, pos) = found?;
        let bucket = self.buckets.get_mut(&priority)?;
        let item = bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&priority);
        }
        if item.is_some() {
            self.len = self.len.saturating_sub(1);
        }
        item
    }

    /// Iterate over queued items in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.values().rev().flat_map(|bucket| bucket.iter())
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every queued item.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================
