//! Tree growth and the sibling-property-preserving weight increment.
//!
//! After every symbol both sides of the codec run exactly the same
//! mutations in exactly the same order, which is what lets the decoder
//! rebuild the encoder's tree from the bit stream alone.

use crate::tree::{CodeTree, NYT_NODE, Node, NodeId};
use ahed_core::error::{AhedError, Result};
use log::trace;

impl CodeTree {
    /// Splice a newly observed byte into the tree by splitting NYT.
    ///
    /// The NYT node is replaced by a fresh internal node that inherits its
    /// position and order; NYT becomes that node's left child (order - 2)
    /// and the new leaf its right child (order - 1). The leaf starts at
    /// weight 0; pass the returned index to [`CodeTree::bubble_up`] to count
    /// the occurrence.
    ///
    /// # Errors
    ///
    /// [`AhedError::InvalidState`] if `symbol` already has a leaf.
    pub fn add_symbol(&mut self, symbol: u8) -> Result<NodeId> {
        if self.leaf(symbol).is_some() {
            return Err(AhedError::invalid_state(format!(
                "symbol {symbol:#04x} is already in the tree"
            )));
        }

        let nyt = self.nodes[NYT_NODE];
        let order = nyt.order;

        // NYT gives up its order before the internal node claims it
        self.set_order(NYT_NODE, order - 2);
        let internal = self.push(Node {
            weight: 0,
            order,
            left: None,
            right: None,
            parent: nyt.parent,
            symbol: None,
        });
        match nyt.parent {
            Some(parent) => self.replace_child(parent, NYT_NODE, internal),
            None => self.root = internal,
        }
        self.nodes[NYT_NODE].parent = Some(internal);

        let leaf = self.push(Node::leaf(Some(symbol), order - 1, Some(internal)));
        self.nodes[internal].left = Some(NYT_NODE);
        self.nodes[internal].right = Some(leaf);
        self.symbols[symbol as usize] = Some(leaf);

        trace!("split NYT for {symbol:#04x}: internal {internal}, leaf {leaf}");
        Ok(leaf)
    }

    /// Find the node of `weight` with the highest order above `min_order`.
    ///
    /// This is the node occupying the top slot of the weight class, i.e.
    /// the one to trade places with before incrementing a node of that
    /// weight so that the `(weight, order)` listing stays sorted.
    pub fn find_swap_candidate(&self, weight: u64, min_order: u32) -> Option<NodeId> {
        match &self.index {
            Some(index) => index
                .highest(weight)
                .filter(|&(order, _)| order > min_order)
                .map(|(_, id)| id),
            None => self
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| node.weight == weight && node.order > min_order)
                .max_by_key(|(_, node)| node.order)
                .map(|(id, _)| id),
        }
    }

    /// Count one occurrence at `start` and restore the sibling property.
    ///
    /// Walks from `start` to the root. At each level the node first trades
    /// places with the top node of its weight class (unless that is its own
    /// parent or the root), then its weight is incremented. At most one swap
    /// happens per level.
    pub fn bubble_up(&mut self, start: NodeId) {
        let mut current = start;
        loop {
            let node = self.nodes[current];
            let candidate = self
                .find_swap_candidate(node.weight, node.order)
                .filter(|&id| id != current && Some(id) != node.parent && id != self.root);
            if let Some(candidate) = candidate {
                self.swap_nodes(current, candidate);
            }

            self.increment_weight(current);

            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    /// Exchange the tree positions of two non-root nodes.
    ///
    /// Each node takes over the other's parent link and order; the subtrees
    /// below them move along untouched.
    fn swap_nodes(&mut self, a: NodeId, b: NodeId) {
        // Bubble-up never selects the root, so both parents exist
        let (Some(parent_a), Some(parent_b)) = (self.nodes[a].parent, self.nodes[b].parent) else {
            return;
        };
        trace!("swap nodes {a} and {b}");

        if parent_a == parent_b {
            let parent = &mut self.nodes[parent_a];
            std::mem::swap(&mut parent.left, &mut parent.right);
        } else {
            self.replace_child(parent_a, a, b);
            self.replace_child(parent_b, b, a);
            self.nodes[a].parent = Some(parent_b);
            self.nodes[b].parent = Some(parent_a);
        }

        self.exchange_orders(a, b);
    }

    /// Re-point whichever child link of `parent` refers to `old`.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let node = &mut self.nodes[parent];
        if node.left == Some(old) {
            node.left = Some(new);
        } else {
            debug_assert_eq!(node.right, Some(old));
            node.right = Some(new);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SwapSearch;
    use crate::tree::{CodeTree, INITIAL_ORDER, NodeId};
    use ahed_core::error::AhedError;

    /// Every arena node must sit in the index under its own weight and order.
    fn assert_index_matches_arena(tree: &CodeTree) {
        let index = tree.index.as_ref().unwrap();
        assert_eq!(index.len(), tree.len());
        for (id, node) in tree.nodes.iter().enumerate() {
            assert_eq!(index.get(node.weight(), node.order()), Some(id), "node {id}");
        }
    }

    fn feed(tree: &mut CodeTree, data: &[u8]) {
        for &symbol in data {
            let node = match tree.leaf(symbol) {
                Some(leaf) => leaf,
                None => {
                    let leaf = tree.add_symbol(symbol).unwrap();
                    tree.validate().unwrap();
                    leaf
                }
            };
            tree.bubble_up(node);
            tree.validate().unwrap();
        }
    }

    #[test]
    fn test_first_split() {
        let mut tree = CodeTree::new(SwapSearch::Linear);
        let leaf = tree.add_symbol(b'a').unwrap();

        let root = tree.root();
        assert_ne!(root, tree.nyt());
        assert_eq!(tree.node(root).left(), Some(tree.nyt()));
        assert_eq!(tree.node(root).right(), Some(leaf));
        assert_eq!(tree.node(root).order(), INITIAL_ORDER);
        assert_eq!(tree.node(tree.nyt()).order(), INITIAL_ORDER - 2);
        assert_eq!(tree.node(leaf).order(), INITIAL_ORDER - 1);
        assert_eq!(tree.node(leaf).weight(), 0);

        tree.bubble_up(leaf);
        assert_eq!(tree.node(leaf).weight(), 1);
        assert_eq!(tree.node(root).weight(), 1);
        assert_eq!(tree.node(tree.nyt()).weight(), 0);
        tree.validate().unwrap();
    }

    #[test]
    fn test_second_split_hangs_below_root() {
        let mut tree = CodeTree::new(SwapSearch::Linear);
        feed(&mut tree, b"ab");

        // NYT keeps its slot and sits two levels down
        let root = tree.root();
        let inner = tree.node(tree.nyt()).parent().unwrap();
        assert_eq!(tree.node(inner).parent(), Some(root));
        assert_eq!(tree.node(root).weight(), 2);
        assert_eq!(tree.symbol_count(), 2);
    }

    #[test]
    fn test_swap_promotes_frequent_symbol() {
        let mut tree = CodeTree::new(SwapSearch::Linear);
        feed(&mut tree, b"abbb");

        // 'b' outweighs the subtree holding NYT and 'a', so it hangs off the root
        let b = tree.leaf(b'b').unwrap();
        assert_eq!(tree.node(b).parent(), Some(tree.root()));
        assert_eq!(tree.node(b).weight(), 3);
        assert_eq!(tree.node(tree.root()).weight(), 4);
    }

    #[test]
    fn test_candidate_prefers_highest_order() {
        let mut tree = CodeTree::new(SwapSearch::Linear);
        feed(&mut tree, b"abcd");

        // Four leaves of weight 1; the lowest-order one must be told to
        // trade with the highest-order one.
        let leaves: Vec<NodeId> = b"abcd".iter().map(|&s| tree.leaf(s).unwrap()).collect();
        let lowest = *leaves
            .iter()
            .min_by_key(|&&id| tree.node(id).order())
            .unwrap();
        let highest = tree
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.weight() == 1)
            .max_by_key(|(_, n)| n.order())
            .map(|(id, _)| id)
            .unwrap();

        let order = tree.node(lowest).order();
        assert_eq!(tree.find_swap_candidate(1, order), Some(highest));
        assert_eq!(tree.find_swap_candidate(1, tree.node(highest).order()), None);
        assert_eq!(tree.find_swap_candidate(42, 0), None);
    }

    #[test]
    fn test_strategies_agree_on_every_query() {
        let data = b"she sells sea shells by the sea shore";
        let mut linear = CodeTree::new(SwapSearch::Linear);
        let mut indexed = CodeTree::new(SwapSearch::Indexed);

        for &symbol in data {
            for id in 0..linear.len() {
                let node = linear.node(id);
                assert_eq!(
                    linear.find_swap_candidate(node.weight(), node.order()),
                    indexed.find_swap_candidate(node.weight(), node.order())
                );
            }
            feed(&mut linear, &[symbol]);
            feed(&mut indexed, &[symbol]);
            assert_eq!(linear, indexed);
        }
    }

    #[test]
    fn test_all_symbols_fill_the_arena() {
        let mut tree = CodeTree::new(SwapSearch::Indexed);
        let data: Vec<u8> = (0..=255).collect();
        feed(&mut tree, &data);

        assert_eq!(tree.symbol_count(), 256);
        assert_eq!(tree.len(), crate::tree::MAX_NODES);
        assert_eq!(tree.node(tree.nyt()).order(), 0);
        assert_eq!(tree.node(tree.root()).weight(), 256);
    }

    #[test]
    fn test_index_tracks_every_node() {
        let mut tree = CodeTree::new(SwapSearch::Indexed);
        feed(&mut tree, b"mississippi");
        let index = tree.index.as_ref().unwrap();
        assert_eq!(index.len(), tree.len());
    }

    #[test]
    fn test_split_keeps_index_consistent() {
        let mut tree = CodeTree::new(SwapSearch::Indexed);

        // Checked between the split and the weight update
        let a = tree.add_symbol(b'a').unwrap();
        assert_index_matches_arena(&tree);
        tree.validate().unwrap();
        tree.bubble_up(a);
        assert_index_matches_arena(&tree);

        let b = tree.add_symbol(b'b').unwrap();
        assert_index_matches_arena(&tree);
        tree.validate().unwrap();
        tree.bubble_up(b);
        assert_index_matches_arena(&tree);

        feed(&mut tree, b"abracadabra");
        assert_index_matches_arena(&tree);
    }

    #[test]
    fn test_add_symbol_rejects_known_byte() {
        let mut tree = CodeTree::new(SwapSearch::Indexed);
        feed(&mut tree, b"xy");
        let before = tree.clone();

        let err = tree.add_symbol(b'x').unwrap_err();
        assert!(matches!(err, AhedError::InvalidState { .. }));
        assert_eq!(tree, before);
        assert_index_matches_arena(&tree);
    }

    #[test]
    fn test_full_alphabet_refuses_another_split() {
        let mut tree = CodeTree::new(SwapSearch::Linear);
        let data: Vec<u8> = (0..=255).collect();
        feed(&mut tree, &data);

        assert!(tree.add_symbol(0).is_err());
        assert_eq!(tree.node(tree.nyt()).order(), 0);
    }
}
