//! Adaptive Huffman encoder (compression).

use crate::config::AhedConfig;
use crate::stats::AhedStats;
use crate::tree::{CodePath, CodeTree, NodeId};
use ahed_core::bitstream::BitWriter;
use ahed_core::error::{AhedError, Result};
use log::{debug, trace};
use std::io::{BufWriter, ErrorKind, Read, Write};

/// Size of the chunks pulled from the input stream.
const INPUT_CHUNK: usize = 32 * 1024;

/// Lifecycle of an [`AhedEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Ready for the next input byte.
    AwaitingSymbol,
    /// The end marker has been written; the stream is complete.
    Done,
    /// A write failed; the partial output is unusable.
    Failed,
}

/// Adaptive Huffman encoder for compression.
///
/// One encoder produces one stream. Its tree starts as the lone NYT node
/// and grows as bytes arrive; no statistics are gathered up front.
#[derive(Debug)]
pub struct AhedEncoder {
    /// Adaptive code tree.
    tree: CodeTree,
    /// Configuration.
    config: AhedConfig,
    /// Scratch buffer for node paths.
    path: CodePath,
    /// Current state.
    state: EncoderState,
    /// Number of bytes encoded so far.
    symbols_encoded: u64,
}

impl AhedEncoder {
    /// Create a new encoder with the given configuration.
    pub fn new(config: AhedConfig) -> Self {
        Self {
            tree: CodeTree::new(config.swap_search),
            config,
            path: CodePath::new(),
            state: EncoderState::AwaitingSymbol,
            symbols_encoded: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// The code tree as of the last encoded symbol.
    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }

    /// Number of bytes encoded so far.
    pub fn symbols_encoded(&self) -> u64 {
        self.symbols_encoded
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            EncoderState::AwaitingSymbol => Ok(()),
            EncoderState::Done => Err(AhedError::invalid_state("encoder already finished")),
            EncoderState::Failed => Err(AhedError::invalid_state("encoder failed earlier")),
        }
    }

    /// Encode one byte and update the tree.
    ///
    /// A byte seen before is sent as the path to its leaf. A new byte is sent
    /// as the path to NYT followed by the byte itself as an 8-bit literal,
    /// after which NYT is split to make room for it.
    pub fn encode_symbol<W: Write>(&mut self, symbol: u8, writer: &mut BitWriter<W>) -> Result<()> {
        self.ensure_ready()?;

        let result = self.step(symbol, writer);
        if result.is_err() {
            self.state = EncoderState::Failed;
        }
        result
    }

    fn step<W: Write>(&mut self, symbol: u8, writer: &mut BitWriter<W>) -> Result<()> {
        let node = match self.tree.leaf(symbol) {
            Some(leaf) => {
                self.write_path(leaf, writer)?;
                leaf
            }
            None => {
                self.write_path(self.tree.nyt(), writer)?;
                writer.write_byte(symbol)?;
                trace!(
                    "new symbol {symbol:#04x} after {} bytes",
                    self.symbols_encoded
                );
                self.tree.add_symbol(symbol)?
            }
        };

        self.tree.bubble_up(node);
        if self.config.validate_tree {
            self.tree.validate()?;
        }

        self.symbols_encoded += 1;
        Ok(())
    }

    /// Emit the root-to-`node` path.
    fn write_path<W: Write>(&mut self, node: NodeId, writer: &mut BitWriter<W>) -> Result<()> {
        self.tree.path_to_root(node, &mut self.path);
        for bit in self.path.root_first() {
            writer.write_bit(bit)?;
        }
        Ok(())
    }

    /// Write the end marker and flush the stream.
    ///
    /// The marker announces a new symbol (NYT path) whose literal is cut
    /// short: only the zero bits that complete the current byte follow, so
    /// the decoder always finds fewer than eight bits where it expects the
    /// literal and stops cleanly.
    pub fn finish<W: Write>(&mut self, writer: &mut BitWriter<W>) -> Result<()> {
        self.ensure_ready()?;

        let result = self
            .write_path(self.tree.nyt(), writer)
            .and_then(|()| writer.flush());
        self.state = match result {
            Ok(()) => EncoderState::Done,
            Err(_) => EncoderState::Failed,
        };
        result
    }

    /// Encode a whole input stream into `output`.
    ///
    /// # Parameters
    ///
    /// - `input`: Plain bytes, read until exhausted
    /// - `output`: Destination of the coded stream
    ///
    /// # Returns
    ///
    /// Byte counters of the plain and coded forms.
    pub fn encode<R: Read, W: Write>(&mut self, mut input: R, output: W) -> Result<AhedStats> {
        let mut writer = BitWriter::new(BufWriter::new(output));
        let mut buffer = vec![0u8; INPUT_CHUNK];
        let mut uncoded_size = 0u64;

        loop {
            let n = match input.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state = EncoderState::Failed;
                    return Err(AhedError::read(e));
                }
            };

            for &symbol in &buffer[..n] {
                self.encode_symbol(symbol, &mut writer)?;
            }
            uncoded_size += n as u64;
        }

        self.finish(&mut writer)?;

        let stats = AhedStats::new(uncoded_size, writer.bytes_written());
        debug!(
            "encoded {} bytes into {} bytes ({} distinct symbols)",
            stats.uncoded_size,
            stats.coded_size,
            self.tree.symbol_count()
        );
        Ok(stats)
    }
}

impl Default for AhedEncoder {
    fn default() -> Self {
        Self::new(AhedConfig::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwapSearch;
    use crate::decoder::AhedDecoder;
    use std::io::{self, Cursor};

    fn encode_bytes(data: &[u8]) -> (Vec<u8>, AhedStats) {
        let mut output = Vec::new();
        let stats = AhedEncoder::default().encode(data, &mut output).unwrap();
        (output, stats)
    }

    #[test]
    fn test_encode_aaab_bits() {
        let (output, stats) = encode_bytes(b"aaab");

        // 'a' literal | 1 | 1 | 0 + 'b' literal | 00 (NYT) + padding
        assert_eq!(output, vec![0x61, 0xCC, 0x40]);
        assert_eq!(stats, AhedStats::new(4, 3));
    }

    #[test]
    fn test_encode_empty() {
        let (output, stats) = encode_bytes(b"");

        // NYT is the root: its path is empty and there is nothing to pad
        assert!(output.is_empty());
        assert_eq!(stats, AhedStats::new(0, 0));
    }

    #[test]
    fn test_encode_single_byte() {
        let (output, stats) = encode_bytes(b"A");

        // Literal, then NYT path "0" padded to a byte
        assert_eq!(output, vec![b'A', 0x00]);
        assert_eq!(stats.coded_size, 2);
    }

    #[test]
    fn test_encode_deterministic() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let (first, _) = encode_bytes(data);
        let (second, _) = encode_bytes(data);
        assert_eq!(first, second);
    }

    #[test]
    fn test_strategies_produce_identical_bytes() {
        let data: Vec<u8> = (0..5000).map(|i| ((i * 7 + i / 13) % 97) as u8).collect();

        let mut linear = Vec::new();
        AhedEncoder::new(AhedConfig::new(SwapSearch::Linear))
            .encode(&data[..], &mut linear)
            .unwrap();
        let mut indexed = Vec::new();
        AhedEncoder::new(AhedConfig::new(SwapSearch::Indexed))
            .encode(&data[..], &mut indexed)
            .unwrap();

        assert_eq!(linear, indexed);
    }

    #[test]
    fn test_encode_skewed_is_near_one_bit() {
        let data = vec![b'z'; 10_000];
        let (output, stats) = encode_bytes(&data);

        // 8-bit literal, 9999 one-bit codes, 1-bit terminator path
        assert_eq!(stats.coded_size, (8 + 9_999 + 1) / 8);
        assert_eq!(output.len() as u64, stats.coded_size);
    }

    #[test]
    fn test_encode_symbol_stepwise() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        let mut encoder = AhedEncoder::new(AhedConfig::DEFAULT.with_validation(true));

        for &symbol in b"abracadabra" {
            encoder.encode_symbol(symbol, &mut writer).unwrap();
        }
        assert_eq!(encoder.symbols_encoded(), 11);
        assert_eq!(encoder.tree().symbol_count(), 5);

        encoder.finish(&mut writer).unwrap();
        assert_eq!(encoder.state(), EncoderState::Done);
        drop(writer);

        let mut decoded = Vec::new();
        AhedDecoder::default()
            .decode(Cursor::new(output), &mut decoded)
            .unwrap();
        assert_eq!(decoded, b"abracadabra");
    }

    #[test]
    fn test_encode_after_finish() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        let mut encoder = AhedEncoder::default();
        encoder.finish(&mut writer).unwrap();

        let err = encoder.encode_symbol(b'x', &mut writer).unwrap_err();
        assert!(matches!(err, AhedError::InvalidState { .. }));
        assert!(encoder.finish(&mut writer).is_err());
    }

    #[test]
    fn test_write_failure_is_fatal() {
        struct Rejecting;
        impl Write for Rejecting {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            }
        }

        let mut encoder = AhedEncoder::default();
        let err = encoder.encode(&b"some input"[..], Rejecting).unwrap_err();
        assert!(matches!(err, AhedError::Write(_)));
        assert_eq!(encoder.state(), EncoderState::Failed);
    }

    #[test]
    fn test_read_failure_is_fatal() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("device error"))
            }
        }

        let mut encoder = AhedEncoder::default();
        let err = encoder.encode(Failing, Vec::new()).unwrap_err();
        assert!(matches!(err, AhedError::Read(_)));
        assert_eq!(encoder.state(), EncoderState::Failed);
    }
}
