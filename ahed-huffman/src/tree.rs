//! Adaptive Huffman code tree store.
//!
//! The tree lives in a flat arena: nodes refer to each other by index, and
//! `None` stands for "no link". Swapping two subtrees is therefore a matter
//! of exchanging a handful of indices; no node ever owns another.
//!
//! Every node carries a `weight` (occurrence count) and an `order` (rank
//! used to break ties between equal weights; higher means closer to the
//! root). The NYT ("not yet transmitted") leaf marks where the next unseen
//! byte will be spliced in.

use crate::config::SwapSearch;
use crate::index::WeightIndex;
use ahed_core::error::{AhedError, Result};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Number of byte symbols in the alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// Arena capacity: 256 byte leaves, one internal node per byte, and NYT.
pub const MAX_NODES: usize = 2 * ALPHABET_SIZE + 1;

/// Arena slot of the NYT node; it keeps this index for its whole life.
pub const NYT_NODE: NodeId = 0;

/// Order given to the initial one-node tree. Each split lowers the NYT
/// order by two, so the last possible split leaves it at zero.
pub const INITIAL_ORDER: u32 = (MAX_NODES - 1) as u32;

/// A single tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub(crate) weight: u64,
    pub(crate) order: u32,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) symbol: Option<u8>,
}

impl Node {
    pub(crate) fn leaf(symbol: Option<u8>, order: u32, parent: Option<NodeId>) -> Self {
        Self {
            weight: 0,
            order,
            left: None,
            right: None,
            parent,
            symbol,
        }
    }

    /// Occurrence count of this node's subtree.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Tie-break rank; higher is closer to the root.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Left child (reached with a 0 bit).
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child (reached with a 1 bit).
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Parent link; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Byte represented by a leaf; `None` for internal nodes and NYT.
    pub fn symbol(&self) -> Option<u8> {
        self.symbol
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Path from a node up to the root, one bit per edge.
///
/// Bits are stored leaf-to-root as they are discovered; transmit them with
/// [`CodePath::root_first`] so the decoder can walk the tree top-down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePath {
    bits: Vec<bool>,
}

impl CodePath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges on the path.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the node is the root itself.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bits in leaf-to-root order.
    pub fn leaf_first(&self) -> &[bool] {
        &self.bits
    }

    /// Bits in transmission (root-to-leaf) order.
    pub fn root_first(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().rev().copied()
    }

    fn clear(&mut self) {
        self.bits.clear();
    }

    fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }
}

/// The adaptive Huffman code tree shared (by construction, not by data)
/// between encoder and decoder.
#[derive(Debug, Clone)]
pub struct CodeTree {
    /// Node arena; `nodes[NYT_NODE]` is always the NYT leaf.
    pub(crate) nodes: Vec<Node>,
    /// Current root.
    pub(crate) root: NodeId,
    /// Byte value -> leaf index, once the byte has been seen.
    pub(crate) symbols: [Option<NodeId>; ALPHABET_SIZE],
    /// Weight/order index, present for [`SwapSearch::Indexed`].
    pub(crate) index: Option<WeightIndex>,
}

impl CodeTree {
    /// Create a fresh tree consisting of the NYT node alone.
    pub fn new(swap_search: SwapSearch) -> Self {
        let mut nodes = Vec::with_capacity(MAX_NODES);
        nodes.push(Node::leaf(None, INITIAL_ORDER, None));

        let index = match swap_search {
            SwapSearch::Linear => None,
            SwapSearch::Indexed => {
                let mut index = WeightIndex::new();
                index.insert(0, INITIAL_ORDER, NYT_NODE);
                Some(index)
            }
        };

        Self {
            nodes,
            root: NYT_NODE,
            symbols: [None; ALPHABET_SIZE],
            index,
        }
    }

    /// Current root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The NYT node.
    pub fn nyt(&self) -> NodeId {
        NYT_NODE
    }

    /// Access a node by index.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an allocated node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Leaf of `symbol`, if the byte has been seen.
    pub fn leaf(&self, symbol: u8) -> Option<NodeId> {
        self.symbols[symbol as usize]
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is just the NYT node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of distinct bytes seen so far.
    pub fn symbol_count(&self) -> usize {
        (self.nodes.len() - 1) / 2
    }

    /// Whether `id` has children.
    pub fn is_internal(&self, id: NodeId) -> bool {
        !self.nodes[id].is_leaf()
    }

    /// Swap search strategy this tree was built with.
    pub fn swap_search(&self) -> SwapSearch {
        if self.index.is_some() {
            SwapSearch::Indexed
        } else {
            SwapSearch::Linear
        }
    }

    /// Collect the path from `node` up to the root into `path`.
    ///
    /// One bit per edge: `true` when the child is its parent's right child.
    /// The path of the root is empty. Cost is O(depth).
    pub fn path_to_root(&self, node: NodeId, path: &mut CodePath) {
        path.clear();

        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            path.push(self.nodes[parent].right == Some(current));
            current = parent;
        }
    }

    /// One step of a top-down walk: the child selected by `bit`.
    ///
    /// Returns `None` when `from` is a leaf.
    #[inline]
    pub fn descend(&self, bit: bool, from: NodeId) -> Option<NodeId> {
        let node = &self.nodes[from];
        if bit { node.right } else { node.left }
    }

    /// Append a node to the arena, registering it in the index.
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        if let Some(index) = self.index.as_mut() {
            index.insert(node.weight, node.order, id);
        }
        self.nodes.push(node);
        id
    }

    /// Add one occurrence to `id`.
    pub(crate) fn increment_weight(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        if let Some(index) = self.index.as_mut() {
            index.remove(node.weight, node.order);
            index.insert(node.weight + 1, node.order, id);
        }
        node.weight += 1;
    }

    /// Move `id` to a new order within its weight class.
    pub(crate) fn set_order(&mut self, id: NodeId, order: u32) {
        let node = &mut self.nodes[id];
        if let Some(index) = self.index.as_mut() {
            index.remove(node.weight, node.order);
            index.insert(node.weight, order, id);
        }
        node.order = order;
    }

    /// Exchange the orders of two nodes.
    pub(crate) fn exchange_orders(&mut self, a: NodeId, b: NodeId) {
        let (node_a, node_b) = (self.nodes[a], self.nodes[b]);
        if let Some(index) = self.index.as_mut() {
            index.remove(node_a.weight, node_a.order);
            index.remove(node_b.weight, node_b.order);
            index.insert(node_a.weight, node_b.order, a);
            index.insert(node_b.weight, node_a.order, b);
        }
        self.nodes[a].order = node_b.order;
        self.nodes[b].order = node_a.order;
    }

    /// Check every structural invariant of the tree.
    ///
    /// Verifies links, the weight sums, the sibling property over
    /// `(weight, order)`, the NYT invariants and the symbol table.
    pub fn validate(&self) -> Result<()> {
        let nyt = &self.nodes[NYT_NODE];
        if !nyt.is_leaf() || nyt.weight != 0 || nyt.symbol.is_some() {
            return Err(AhedError::tree_invariant(format!(
                "NYT must be an empty leaf of weight 0, found {nyt:?}"
            )));
        }
        if self.nodes[self.root].parent.is_some() {
            return Err(AhedError::tree_invariant("root has a parent"));
        }

        // Listing by order must give strictly increasing orders and
        // non-decreasing weights, NYT first and root last.
        let mut by_order: Vec<NodeId> = (0..self.nodes.len()).collect();
        by_order.sort_by_key(|&id| self.nodes[id].order);

        if by_order.first() != Some(&NYT_NODE) {
            return Err(AhedError::tree_invariant("NYT does not hold the lowest order"));
        }
        if by_order.last() != Some(&self.root) {
            return Err(AhedError::tree_invariant("root does not hold the highest order"));
        }
        for pair in by_order.windows(2) {
            let (low, high) = (&self.nodes[pair[0]], &self.nodes[pair[1]]);
            if low.order == high.order {
                return Err(AhedError::tree_invariant(format!(
                    "nodes {} and {} share order {}",
                    pair[0], pair[1], low.order
                )));
            }
            if low.weight > high.weight {
                return Err(AhedError::tree_invariant(format!(
                    "node {} (order {}, weight {}) outweighs node {} (order {}, weight {})",
                    pair[0], low.order, low.weight, pair[1], high.order, high.weight
                )));
            }
        }

        let mut leaves = 0;
        for (id, node) in self.nodes.iter().enumerate() {
            if id != self.root {
                let parent = node.parent.ok_or_else(|| {
                    AhedError::tree_invariant(format!("node {id} is detached from the tree"))
                })?;
                let up = &self.nodes[parent];
                if up.left != Some(id) && up.right != Some(id) {
                    return Err(AhedError::tree_invariant(format!(
                        "node {id} is not a child of its parent {parent}"
                    )));
                }
            }

            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    let (l, r) = (&self.nodes[left], &self.nodes[right]);
                    if node.weight != l.weight + r.weight {
                        return Err(AhedError::tree_invariant(format!(
                            "node {id} weighs {} but its children sum to {}",
                            node.weight,
                            l.weight + r.weight
                        )));
                    }
                    if r.order != l.order + 1 || r.order >= node.order {
                        return Err(AhedError::tree_invariant(format!(
                            "children of node {id} are not adjacent siblings below it"
                        )));
                    }
                    if node.symbol.is_some() {
                        return Err(AhedError::tree_invariant(format!(
                            "internal node {id} carries a symbol"
                        )));
                    }
                }
                (None, None) if id == NYT_NODE => {}
                (None, None) => {
                    let symbol = node.symbol.ok_or_else(|| {
                        AhedError::tree_invariant(format!("leaf {id} has no symbol"))
                    })?;
                    if self.symbols[symbol as usize] != Some(id) {
                        return Err(AhedError::tree_invariant(format!(
                            "symbol table does not map {symbol:#04x} to leaf {id}"
                        )));
                    }
                    leaves += 1;
                }
                _ => {
                    return Err(AhedError::tree_invariant(format!(
                        "node {id} has exactly one child"
                    )));
                }
            }
        }

        if leaves != self.symbols.iter().flatten().count() {
            return Err(AhedError::tree_invariant(
                "symbol table references nodes that are not leaves",
            ));
        }

        Ok(())
    }
}

/// Trees are equal when their arenas, roots and symbol tables match; the
/// swap index is derived state and does not take part.
impl PartialEq for CodeTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.root == other.root && self.symbols == other.symbols
    }
}

impl Eq for CodeTree {}
