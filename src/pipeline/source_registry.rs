//! Incoming edges of a consumer.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::traits::ImageProducer;

/// Sparse slot array mapping an input index to the producer feeding it.
///
/// Holds strong references: a consumer keeps its upstream alive, while the
/// upstream only refers back weakly through its
/// [`TargetRegistry`](super::TargetRegistry). Slot indices are stable;
/// clearing one never shifts the others.
#[derive(Default)]
pub struct SourceRegistry {
    slots: Mutex<BTreeMap<usize, Arc<dyn ImageProducer>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupies the lowest free slot below `maximum_inputs` and returns it.
    /// Returns `None` when every slot is taken.
    pub fn append(&self, producer: Arc<dyn ImageProducer>, maximum_inputs: usize) -> Option<usize> {
        let mut slots = self.slots.lock();
        let slot = (0..maximum_inputs).find(|slot| !slots.contains_key(slot))?;
        slots.insert(slot, producer);
        Some(slot)
    }

    /// Occupies `at_index`, returning the producer previously there.
    ///
    /// # Panics
    /// If `at_index >= maximum_inputs`. Addressing a slot the consumer does
    /// not have is a programming error.
    pub fn insert(
        &self,
        producer: Arc<dyn ImageProducer>,
        at_index: usize,
        maximum_inputs: usize,
    ) -> Option<Arc<dyn ImageProducer>> {
        assert!(
            at_index < maximum_inputs,
            "Input slot {} out of range (maximum inputs {})",
            at_index,
            maximum_inputs
        );
        self.slots.lock().insert(at_index, producer)
    }

    /// Clears `index`. Does nothing if it is already empty.
    pub fn remove_at_index(&self, index: usize) {
        let removed = self.slots.lock().remove(&index);
        drop(removed);
    }

    /// Clears `index` only if it is still held by `owner`.
    pub(crate) fn release_slot<P: ImageProducer + ?Sized>(&self, index: usize, owner: &P) {
        let removed = {
            let mut slots = self.slots.lock();
            match slots.get(&index) {
                Some(current) if owner.is_same_producer(current.as_ref()) => {
                    slots.remove(&index)
                }
                _ => None,
            }
        };
        drop(removed);
    }

    pub fn get(&self, index: usize) -> Option<Arc<dyn ImageProducer>> {
        self.slots.lock().get(&index).cloned()
    }

    /// Occupied slot indices in ascending order.
    pub fn occupied_slots(&self) -> Vec<usize> {
        self.slots.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::TestProducer;

    fn producer() -> Arc<dyn ImageProducer> {
        Arc::new(TestProducer::new())
    }

    #[test]
    fn test_append_takes_lowest_free_slot() {
        let registry = SourceRegistry::new();

        assert_eq!(registry.append(producer(), 3), Some(0));
        assert_eq!(registry.append(producer(), 3), Some(1));

        registry.remove_at_index(0);
        assert_eq!(registry.append(producer(), 3), Some(0));
        assert_eq!(registry.append(producer(), 3), Some(2));
        assert_eq!(registry.occupied_slots(), vec![0, 1, 2]);
    }

    #[test]
    fn test_append_without_capacity() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.append(producer(), 1), Some(0));
        assert_eq!(registry.append(producer(), 1), None);
        assert_eq!(registry.len(), 1);

        assert_eq!(SourceRegistry::new().append(producer(), 0), None);
    }

    #[test]
    fn test_removal_does_not_shift() {
        let registry = SourceRegistry::new();
        let second = producer();
        registry.insert(producer(), 0, 4);
        registry.insert(second.clone(), 3, 4);

        registry.remove_at_index(0);
        registry.remove_at_index(1);

        assert_eq!(registry.occupied_slots(), vec![3]);
        assert!(Arc::ptr_eq(&registry.get(3).unwrap(), &second));
        assert!(registry.get(0).is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let registry = SourceRegistry::new();
        let first = producer();
        assert!(registry.insert(first.clone(), 1, 2).is_none());

        let previous = registry.insert(producer(), 1, 2).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_insert_out_of_range_panics() {
        let registry = SourceRegistry::new();
        registry.insert(producer(), 2, 2);
    }

    #[test]
    fn test_release_slot_checks_owner() {
        let registry = SourceRegistry::new();
        let owner = producer();
        let other = producer();
        registry.insert(owner.clone(), 0, 1);

        registry.release_slot(0, other.as_ref());
        assert_eq!(registry.len(), 1);

        registry.release_slot(0, owner.as_ref());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_slot_with_concrete_owner() {
        let registry = SourceRegistry::new();
        let owner = Arc::new(TestProducer::new());
        let stranger = TestProducer::new();
        registry.insert(owner.clone(), 2, 3);

        assert!(owner.is_same_producer(registry.get(2).unwrap().as_ref()));
        assert!(!stranger.is_same_producer(&*owner));

        registry.release_slot(2, &stranger);
        assert_eq!(registry.occupied_slots(), vec![2]);

        registry.release_slot(2, owner.as_ref());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_holds_producers_strongly() {
        let registry = SourceRegistry::new();
        let p = producer();
        let weak = Arc::downgrade(&p);
        registry.append(p, 1);

        assert!(weak.upgrade().is_some());
        registry.remove_at_index(0);
        assert!(weak.upgrade().is_none());
    }
}
