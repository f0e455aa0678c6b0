//! # AHED-Huffman: Adaptive Huffman Coding
//!
//! This crate provides one-pass adaptive Huffman compression and
//! decompression of byte streams (the FGK algorithm).
//!
//! ## Features
//!
//! - **One pass**: No pre-scan, no frequency table in the output
//! - **Symmetric**: The decoder rebuilds the encoder's tree from the bits alone
//! - **Streaming**: Works over any `Read`/`Write` pair
//! - **Pure Rust**: 100% safe Rust
//!
//! ## Stream Format
//!
//! - **MSB-first bit order**: Bits are packed from most significant to least
//! - **Known byte**: Root-to-leaf path of its leaf (0 = left, 1 = right)
//! - **New byte**: Root-to-NYT path followed by the byte as an 8-bit literal
//! - **End marker**: Root-to-NYT path, then zero padding to the byte boundary
//! - **No header**: Nothing precedes the first literal
//!
//! The decoder sees the end marker as a new-byte announcement whose literal
//! never arrives, since fewer than eight bits remain after it.
//!
//! ## Example
//!
//! ```rust
//! use ahed_huffman::{compress, decompress};
//!
//! let original = b"abracadabra";
//!
//! // Compress
//! let compressed = compress(original).unwrap();
//!
//! // Decompress
//! let decompressed = decompress(&compressed).unwrap();
//!
//! assert_eq!(decompressed, original);
//! ```
//!
//! ## Streams and Statistics
//!
//! ```rust
//! use ahed_huffman::{decode, encode};
//!
//! let mut coded = Vec::new();
//! let stats = encode(&b"aaab"[..], &mut coded).unwrap();
//! assert_eq!(coded, [0x61, 0xCC, 0x40]);
//! assert_eq!((stats.uncoded_size, stats.coded_size), (4, 3));
//!
//! let mut plain = Vec::new();
//! let stats = decode(&coded[..], &mut plain).unwrap();
//! assert_eq!(plain, b"aaab");
//! assert_eq!(stats.uncoded_size, 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod decoder;
mod encoder;
mod index;
mod rebalance;
mod stats;
pub mod tree;

pub use ahed_core::error::{AhedError, Result};
pub use config::{AhedConfig, SwapSearch};
pub use decoder::{AhedDecoder, DecoderState};
pub use encoder::{AhedEncoder, EncoderState};
pub use stats::AhedStats;
pub use tree::CodeTree;

use std::io::{Read, Write};

/// Encode `input` into `output` with the given configuration.
///
/// # Parameters
///
/// - `input`: Plain byte stream, read until exhausted
/// - `output`: Destination of the coded stream
/// - `config`: Codec configuration
///
/// # Returns
///
/// Byte counters of the plain and coded forms.
pub fn encode_with_config<R: Read, W: Write>(
    input: R,
    output: W,
    config: AhedConfig,
) -> Result<AhedStats> {
    AhedEncoder::new(config).encode(input, output)
}

/// Decode `input` into `output` with the given configuration.
///
/// # Parameters
///
/// - `input`: Coded stream, read until the end marker
/// - `output`: Destination of the plain bytes
/// - `config`: Codec configuration
///
/// # Returns
///
/// Byte counters of the plain and coded forms.
pub fn decode_with_config<R: Read, W: Write>(
    input: R,
    output: W,
    config: AhedConfig,
) -> Result<AhedStats> {
    AhedDecoder::new(config).decode(input, output)
}

/// Encode `input` into `output` (convenience function).
///
/// This is equivalent to `encode_with_config(input, output, AhedConfig::DEFAULT)`.
///
/// # Example
///
/// ```rust
/// use ahed_huffman::encode;
///
/// let mut coded = Vec::new();
/// let stats = encode(&b"A"[..], &mut coded).unwrap();
/// assert_eq!(coded, [b'A', 0x00]);
/// assert_eq!(stats.coded_size, 2);
/// ```
pub fn encode<R: Read, W: Write>(input: R, output: W) -> Result<AhedStats> {
    encode_with_config(input, output, AhedConfig::DEFAULT)
}

/// Decode `input` into `output` (convenience function).
///
/// This is equivalent to `decode_with_config(input, output, AhedConfig::DEFAULT)`.
///
/// # Example
///
/// ```rust
/// use ahed_huffman::decode;
///
/// let mut plain = Vec::new();
/// let stats = decode(&[b'A', 0x00][..], &mut plain).unwrap();
/// assert_eq!(plain, b"A");
/// assert_eq!(stats.uncoded_size, 1);
/// ```
pub fn decode<R: Read, W: Write>(input: R, output: W) -> Result<AhedStats> {
    decode_with_config(input, output, AhedConfig::DEFAULT)
}

/// Compress a byte slice.
///
/// # Example
///
/// ```rust
/// use ahed_huffman::compress;
///
/// let data = vec![b'z'; 1000];
/// let compressed = compress(&data).unwrap();
/// assert!(compressed.len() < data.len() / 7);
/// ```
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() / 2);
    encode(data, &mut output)?;
    Ok(output)
}

/// Decompress a byte slice produced by [`compress`] or [`encode`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    decode(data, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_roundtrip() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        let compressed = compress(original).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_empty_roundtrip() {
        let compressed = compress(b"").unwrap();
        assert!(compressed.is_empty());
        assert!(decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_config_variants_roundtrip() {
        let original = b"adaptive huffman coding keeps the sibling property";
        for config in [
            AhedConfig::DEFAULT,
            AhedConfig::LINEAR,
            AhedConfig::DEFAULT.with_validation(true),
        ] {
            let mut coded = Vec::new();
            let encoded = encode_with_config(&original[..], &mut coded, config).unwrap();
            let mut plain = Vec::new();
            let decoded = decode_with_config(&coded[..], &mut plain, config).unwrap();

            assert_eq!(plain, original);
            assert_eq!(encoded, decoded);
        }
    }

    #[test]
    fn test_stats_match_buffers() {
        let original: Vec<u8> = (0..2000u32).map(|i| (i % 17) as u8).collect();
        let mut coded = Vec::new();
        let stats = encode(&original[..], &mut coded).unwrap();

        assert_eq!(stats.uncoded_size, original.len() as u64);
        assert_eq!(stats.coded_size, coded.len() as u64);
        assert!(stats.compression_ratio().unwrap() < 1.0);
    }
}
