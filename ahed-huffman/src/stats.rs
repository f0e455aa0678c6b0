//! Byte counters reported by an encode or decode call.

use std::fmt;

/// Sizes of the original and coded forms of one stream.
///
/// Both encoding and decoding report the same pair: `uncoded_size` is the
/// plain byte count, `coded_size` the adaptive Huffman byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AhedStats {
    /// Bytes in the uncompressed stream.
    pub uncoded_size: u64,
    /// Bytes in the compressed stream.
    pub coded_size: u64,
}

impl AhedStats {
    /// Create a statistics record.
    pub fn new(uncoded_size: u64, coded_size: u64) -> Self {
        Self {
            uncoded_size,
            coded_size,
        }
    }

    /// Coded size as a fraction of the uncoded size.
    ///
    /// `None` for an empty stream.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.uncoded_size == 0 {
            None
        } else {
            Some(self.coded_size as f64 / self.uncoded_size as f64)
        }
    }

    /// Average number of coded bits spent per uncoded byte.
    pub fn bits_per_symbol(&self) -> Option<f64> {
        self.compression_ratio().map(|ratio| ratio * 8.0)
    }
}

impl fmt::Display for AhedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uncodedSize = {}, codedSize = {}",
            self.uncoded_size, self.coded_size
        )?;
        if let Some(ratio) = self.compression_ratio() {
            write!(f, " ({:.1}%)", ratio * 100.0)?;
        }
        Ok(())
    }
}
