//! Codec configuration.
//!
//! Nothing here changes the wire format: an encoder and a decoder built
//! from any two configurations interoperate.

/// Strategy used to find the swap partner during bubble-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapSearch {
    /// Scan every allocated node. O(nodes) per tree level.
    Linear,
    /// Keep nodes indexed by weight, then order. O(log nodes) per level.
    #[default]
    Indexed,
}

/// Adaptive Huffman configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AhedConfig {
    /// How swap candidates are located.
    pub swap_search: SwapSearch,
    /// Run the full tree invariant check after every symbol.
    ///
    /// Costs O(nodes log nodes) per symbol; meant for diagnostics.
    pub validate_tree: bool,
}

impl AhedConfig {
    /// Standard configuration: indexed swap search, no per-symbol validation.
    pub const DEFAULT: Self = Self {
        swap_search: SwapSearch::Indexed,
        validate_tree: false,
    };

    /// Configuration that reproduces the plain node scan.
    pub const LINEAR: Self = Self {
        swap_search: SwapSearch::Linear,
        validate_tree: false,
    };

    /// Create a configuration with the given swap search strategy.
    pub fn new(swap_search: SwapSearch) -> Self {
        Self {
            swap_search,
            ..Self::DEFAULT
        }
    }

    /// Enable or disable per-symbol tree validation.
    pub fn with_validation(mut self, validate_tree: bool) -> Self {
        self.validate_tree = validate_tree;
        self
    }

    /// Replace the swap search strategy.
    pub fn with_swap_search(mut self, swap_search: SwapSearch) -> Self {
        self.swap_search = swap_search;
        self
    }
}

impl Default for AhedConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
