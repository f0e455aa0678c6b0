//! Secondary index over tree nodes, keyed by weight and then order.
//!
//! Bubble-up needs "the highest-order node of weight `w`" once per tree
//! level. Keeping every node in a per-weight ordered map answers that with
//! one lookup instead of a scan of the whole node array.

use crate::tree::NodeId;
use std::collections::BTreeMap;

/// Nodes grouped by weight, each group ordered by node order.
#[derive(Debug, Clone, Default)]
pub(crate) struct WeightIndex {
    classes: BTreeMap<u64, BTreeMap<u32, NodeId>>,
}

impl WeightIndex {
    /// Create an empty index.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `id` at `(weight, order)`.
    pub(crate) fn insert(&mut self, weight: u64, order: u32, id: NodeId) {
        let previous = self.classes.entry(weight).or_default().insert(order, id);
        debug_assert!(previous.is_none(), "order {order} registered twice");
    }

    /// Forget whatever node sits at `(weight, order)`.
    pub(crate) fn remove(&mut self, weight: u64, order: u32) {
        if let Some(class) = self.classes.get_mut(&weight) {
            class.remove(&order);
            if class.is_empty() {
                self.classes.remove(&weight);
            }
        }
    }

    /// The node with the highest order among those of the given weight.
    pub(crate) fn highest(&self, weight: u64) -> Option<(u32, NodeId)> {
        self.classes
            .get(&weight)
            .and_then(|class| class.last_key_value())
            .map(|(&order, &id)| (order, id))
    }

    /// Node registered at `(weight, order)`.
    #[cfg(test)]
    pub(crate) fn get(&self, weight: u64, order: u32) -> Option<NodeId> {
        self.classes.get(&weight)?.get(&order).copied()
    }

    /// Total number of indexed nodes.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.classes.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_in_class() {
        let mut index = WeightIndex::new();
        index.insert(3, 10, 1);
        index.insert(3, 14, 2);
        index.insert(3, 12, 3);
        index.insert(4, 20, 4);

        assert_eq!(index.highest(3), Some((14, 2)));
        assert_eq!(index.highest(4), Some((20, 4)));
        assert_eq!(index.highest(5), None);
        assert_eq!(index.get(3, 12), Some(3));
        assert_eq!(index.get(3, 13), None);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_remove_drops_empty_class() {
        let mut index = WeightIndex::new();
        index.insert(1, 5, 7);
        index.remove(1, 5);
        assert_eq!(index.highest(1), None);
        assert_eq!(index.len(), 0);

        // Removing something absent is a no-op
        index.remove(9, 9);
        assert_eq!(index.len(), 0);
    }
}
