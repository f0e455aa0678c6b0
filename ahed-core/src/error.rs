//! Error types for AHED operations.
//!
//! A single error type covers the bit stream layer and the codec built on
//! top of it, so failures propagate with `?` from the innermost bit read
//! to the public `encode`/`decode` entry points unchanged.

use std::io;
use thiserror::Error;

/// The main error type for AHED operations.
#[derive(Debug, Error)]
pub enum AhedError {
    /// The underlying input stream returned an error.
    #[error("Stream read failed: {0}")]
    Read(#[source] io::Error),

    /// The underlying output stream rejected a write or flush.
    #[error("Stream write failed: {0}")]
    Write(#[source] io::Error),

    /// The input ran out while a complete unit was expected.
    #[error("Unexpected end of stream at bit position {bit_position}")]
    UnexpectedEof {
        /// Number of bits successfully consumed before the stream ended.
        bit_position: u64,
    },

    /// The coded stream does not describe a valid symbol sequence.
    #[error("Corrupted data at bit position {bit_position}: {message}")]
    CorruptedData {
        /// Bit position where the corruption was detected.
        bit_position: u64,
        /// Description of the corruption.
        message: String,
    },

    /// An encoder or decoder was used after it finished or failed.
    #[error("Invalid codec state: {message}")]
    InvalidState {
        /// Description of the misuse.
        message: String,
    },

    /// The adaptive code tree violated one of its invariants.
    #[error("Tree invariant violated: {message}")]
    TreeInvariant {
        /// Which invariant failed, and where.
        message: String,
    },
}

/// Result type alias for AHED operations.
pub type Result<T> = std::result::Result<T, AhedError>;

impl AhedError {
    /// Create a stream read error.
    pub fn read(source: io::Error) -> Self {
        Self::Read(source)
    }

    /// Create a stream write error.
    pub fn write(source: io::Error) -> Self {
        Self::Write(source)
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(bit_position: u64) -> Self {
        Self::UnexpectedEof { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(bit_position: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            bit_position,
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a tree invariant error.
    pub fn tree_invariant(message: impl Into<String>) -> Self {
        Self::TreeInvariant {
            message: message.into(),
        }
    }

    /// Whether this error means the input simply ran out of bits.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. })
    }
}
