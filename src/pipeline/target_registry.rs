//! Outgoing edges of a producer.
//!
//! [`TargetRegistry`] stores, in insertion order, a weak reference to every
//! downstream consumer together with the input slot the edge occupies there.
//!
//! # Thread Safety
//! All operations on one registry go through a single mutex, so they are
//! totally ordered. Iteration takes a snapshot of the live targets inside
//! that order: it sees every earlier mutation and none of the later ones,
//! and consumers are notified after the lock is released.
//!
//! # Lifetime
//! The registry never keeps a consumer alive. An entry whose consumer has
//! been dropped is discovered and discarded the next time the registry is
//! walked; nobody has to deregister explicitly.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use super::traits::ImageConsumer;

struct TargetEntry {
    consumer: Weak<dyn ImageConsumer>,
    slot: usize,
}

impl TargetEntry {
    fn addresses(&self, consumer: &Arc<dyn ImageConsumer>) -> bool {
        std::ptr::addr_eq(self.consumer.as_ptr(), Arc::as_ptr(consumer))
    }
}

/// A live consumer resolved from a [`TargetRegistry`] entry.
#[derive(Clone)]
pub struct LiveTarget {
    pub consumer: Arc<dyn ImageConsumer>,
    pub slot: usize,
}

#[derive(Default)]
pub struct TargetRegistry {
    entries: Mutex<Vec<TargetEntry>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an edge to `consumer` at its input `slot`.
    pub fn append(&self, consumer: &Arc<dyn ImageConsumer>, slot: usize) {
        self.entries.lock().push(TargetEntry {
            consumer: Arc::downgrade(consumer),
            slot,
        });
    }

    /// Resolves the live targets in insertion order, discarding entries whose
    /// consumer no longer exists.
    pub fn live_targets(&self) -> Vec<LiveTarget> {
        let mut entries = self.entries.lock();
        let mut live = Vec::with_capacity(entries.len());
        entries.retain(|entry| match entry.consumer.upgrade() {
            Some(consumer) => {
                live.push(LiveTarget {
                    consumer,
                    slot: entry.slot,
                });
                true
            }
            None => {
                trace!(slot = entry.slot, "Pruning dropped target");
                false
            }
        });
        live
    }

    /// Iterates a snapshot of the live targets. Each call takes a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = LiveTarget> + use<> {
        self.live_targets().into_iter()
    }

    /// Clears every entry.
    pub fn remove_all(&self) {
        self.entries.lock().clear();
    }

    /// Clears every entry and returns the ones that were still live, as one
    /// registry operation.
    pub fn take_all(&self) -> Vec<LiveTarget> {
        let entries = std::mem::take(&mut *self.entries.lock());
        entries
            .into_iter()
            .filter_map(|entry| {
                entry.consumer.upgrade().map(|consumer| LiveTarget {
                    consumer,
                    slot: entry.slot,
                })
            })
            .collect()
    }

    /// Removes the edge to `consumer` at `slot`. Returns whether one existed.
    pub fn remove_edge(&self, consumer: &Arc<dyn ImageConsumer>, slot: usize) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| !(entry.slot == slot && entry.addresses(consumer)));
        entries.len() != before
    }

    /// Removes every edge to `consumer` and returns the slots they occupied.
    pub fn remove_consumer(&self, consumer: &Arc<dyn ImageConsumer>) -> Vec<usize> {
        let mut removed = Vec::new();
        self.entries.lock().retain(|entry| {
            if entry.addresses(consumer) {
                removed.push(entry.slot);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Number of entries, including dropped consumers not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
