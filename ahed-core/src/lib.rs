//! # AHED Core
//!
//! Core components for the AHED adaptive Huffman workspace.
//!
//! This crate provides the fundamental building blocks the codec is
//! layered on:
//!
//! - [`bitstream`]: MSB-first bit-level I/O over `Read`/`Write`
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L2: Codec                                               │
//! │     Adaptive Huffman tree, encoder, decoder             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, AhedError                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ahed_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! let mut writer = BitWriter::new(&mut output);
//! writer.write_byte(b'A').unwrap();
//! writer.write_bits(0b1, 1).unwrap();
//! writer.flush().unwrap();
//! drop(writer);
//!
//! let mut reader = BitReader::new(Cursor::new(output));
//! assert_eq!(reader.read_symbol().unwrap(), b'A');
//! assert!(reader.read_bit().unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{AhedError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{AhedError, Result};
}
