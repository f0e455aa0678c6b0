//! Adaptive Huffman decoder (decompression).
//!
//! The decoder never sees the symbols the encoder saw; it infers each one
//! from the bits already consumed and then applies the very same tree
//! update, so both trees stay identical after every symbol.

use crate::config::AhedConfig;
use crate::stats::AhedStats;
use crate::tree::CodeTree;
use ahed_core::bitstream::BitReader;
use ahed_core::error::{AhedError, Result};
use log::{debug, trace};
use std::io::{BufReader, BufWriter, Read, Write};

/// Lifecycle of an [`AhedDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Ready to walk the tree for the next code.
    AwaitingCode,
    /// The end marker has been seen.
    Done,
    /// The stream was corrupt or an I/O operation failed.
    Failed,
}

/// Adaptive Huffman decoder for decompression.
#[derive(Debug)]
pub struct AhedDecoder {
    /// Adaptive code tree.
    tree: CodeTree,
    /// Configuration.
    config: AhedConfig,
    /// Current state.
    state: DecoderState,
    /// Number of bytes decoded so far.
    symbols_decoded: u64,
}

impl AhedDecoder {
    /// Create a new decoder with the given configuration.
    pub fn new(config: AhedConfig) -> Self {
        Self {
            tree: CodeTree::new(config.swap_search),
            config,
            state: DecoderState::AwaitingCode,
            symbols_decoded: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// The code tree as of the last decoded symbol.
    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }

    /// Number of bytes decoded so far.
    pub fn symbols_decoded(&self) -> u64 {
        self.symbols_decoded
    }

    /// Decode the next byte, updating the tree.
    ///
    /// Walks from the root, one bit per level, until a leaf is reached. A
    /// symbol leaf yields its byte. NYT is followed by an 8-bit literal
    /// naming a new byte; if the stream ends before those eight bits are
    /// available, that is the end marker and `Ok(None)` is returned. Since a
    /// fresh tree is NYT alone, the first byte is always read as a bare
    /// literal.
    ///
    /// Running out of bits while still inside the tree is corruption.
    pub fn decode_symbol<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<Option<u8>> {
        match self.state {
            DecoderState::AwaitingCode => {}
            DecoderState::Done => return Ok(None),
            DecoderState::Failed => {
                return Err(AhedError::invalid_state("decoder failed earlier"));
            }
        }

        match self.step(reader) {
            Ok(Some(symbol)) => {
                self.symbols_decoded += 1;
                Ok(Some(symbol))
            }
            Ok(None) => {
                self.state = DecoderState::Done;
                Ok(None)
            }
            Err(e) => {
                self.state = DecoderState::Failed;
                Err(e)
            }
        }
    }

    fn step<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<Option<u8>> {
        let mut current = self.tree.root();
        while self.tree.is_internal(current) {
            let bit = reader.read_bit().map_err(|e| {
                if e.is_eof() {
                    AhedError::corrupted(reader.bit_position(), "stream ended inside a code path")
                } else {
                    e
                }
            })?;
            if let Some(next) = self.tree.descend(bit, current) {
                current = next;
            }
        }

        let node = if current == self.tree.nyt() {
            let symbol = match reader.read_symbol() {
                Ok(symbol) => symbol,
                Err(e) if e.is_eof() => {
                    trace!("end marker after {} bytes", self.symbols_decoded);
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            if self.tree.leaf(symbol).is_some() {
                return Err(AhedError::corrupted(
                    reader.bit_position(),
                    format!("literal {symbol:#04x} announced as new but already coded"),
                ));
            }
            trace!(
                "new symbol {symbol:#04x} after {} bytes",
                self.symbols_decoded
            );
            self.tree.add_symbol(symbol)?
        } else {
            current
        };

        let symbol = self.tree.node(node).symbol().ok_or_else(|| {
            AhedError::corrupted(reader.bit_position(), "code path ends on a symbol-less leaf")
        })?;

        self.tree.bubble_up(node);
        if self.config.validate_tree {
            self.tree.validate()?;
        }

        Ok(Some(symbol))
    }

    /// Decode a whole coded stream into `output`.
    ///
    /// # Parameters
    ///
    /// - `input`: Coded stream, read until the end marker
    /// - `output`: Destination of the plain bytes
    ///
    /// # Returns
    ///
    /// Byte counters of the plain and coded forms.
    pub fn decode<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<AhedStats> {
        let mut reader = BitReader::new(BufReader::new(input));
        let mut writer = BufWriter::new(output);
        let mut uncoded_size = 0u64;

        while let Some(symbol) = self.decode_symbol(&mut reader)? {
            if let Err(e) = writer.write_all(&[symbol]) {
                self.state = DecoderState::Failed;
                return Err(AhedError::write(e));
            }
            uncoded_size += 1;
        }

        if let Err(e) = writer.flush() {
            self.state = DecoderState::Failed;
            return Err(AhedError::write(e));
        }

        let stats = AhedStats::new(uncoded_size, reader.bytes_read());
        debug!(
            "decoded {} bytes into {} bytes ({} distinct symbols)",
            stats.coded_size,
            stats.uncoded_size,
            self.tree.symbol_count()
        );
        Ok(stats)
    }
}

impl Default for AhedDecoder {
    fn default() -> Self {
        Self::new(AhedConfig::DEFAULT)
    }
}
