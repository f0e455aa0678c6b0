//! Bit-level I/O for variable-length codes.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data at the bit level over any `Read`/`Write` implementation. Each value
//! owns its partial-byte state, so independent streams never interfere.
//!
//! # Bit Ordering
//!
//! Adaptive Huffman paths and literals are packed MSB-first: the first bit
//! written lands in the most significant bit of the first byte, and a
//! multi-bit value is emitted starting from its most significant bit.
//!
//! # Example
//!
//! ```
//! use ahed_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! // Writing bits
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();  // Write 3 bits
//!     writer.write_bits(0b1100, 4).unwrap(); // Write 4 bits
//!     writer.flush().unwrap();
//! }
//! assert_eq!(output, vec![0b1011_1000]);
//!
//! // Reading bits
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{AhedError, Result};
use std::io::{ErrorKind, Read, Write};

/// A bit-level reader that wraps any `Read` implementation.
///
/// Bytes are pulled from the underlying reader one at a time and only when
/// the previous byte has been fully consumed, so `bytes_read()` reports
/// exactly how much of the coded stream has been touched.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Current byte, consumed from the MSB side.
    buffer: u8,
    /// Number of unread bits left in `buffer`.
    bits_in_buffer: u8,
    /// Bytes pulled from the underlying reader.
    bytes_read: u64,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            bytes_read: 0,
            total_bits_read: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Unread bits of the current byte are discarded.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Number of bytes consumed from the underlying reader.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Get the current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Pull the next byte from the underlying reader.
    fn refill(&mut self) -> Result<()> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Err(AhedError::unexpected_eof(self.total_bits_read)),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(AhedError::read(e)),
            }
        }

        self.buffer = byte[0];
        self.bits_in_buffer = 8;
        self.bytes_read += 1;
        Ok(())
    }

    /// Read a single bit.
    ///
    /// Fails with [`AhedError::UnexpectedEof`] once the underlying stream is
    /// exhausted.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_in_buffer == 0 {
            self.refill()?;
        }

        let bit = self.buffer & 0x80 != 0;
        self.buffer <<= 1;
        self.bits_in_buffer -= 1;
        self.total_bits_read += 1;

        Ok(bit)
    }

    /// Read up to 32 bits from the stream, first bit read in the MSB.
    ///
    /// On failure the bits consumed before the error stay consumed.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Read an 8-bit literal symbol, most significant bit first.
    ///
    /// This is eight sequential single-bit reads; if the stream ends before
    /// the eighth bit, the first failure is propagated.
    pub fn read_symbol(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// `BitWriter` accumulates bits in an internal buffer and writes each byte
/// to the underlying writer as soon as eight bits have been collected. Call
/// `flush()` when done to write any remaining partial byte.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (MSB-first, valid bits in the low `bits_in_buffer` bits).
    buffer: u64,
    /// Number of bits in buffer (always < 8 between calls).
    bits_in_buffer: u8,
    /// Complete bytes handed to the underlying writer.
    bytes_written: u64,
    /// Total bits written, padding included.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            bytes_written: 0,
            total_bits_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume this `BitWriter` and return the underlying writer.
    ///
    /// This flushes any remaining bits before returning the writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    /// Number of complete bytes written to the underlying writer.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Number of bits waiting for the current byte to fill up.
    pub fn pending_bits(&self) -> u8 {
        self.bits_in_buffer
    }

    /// Write complete bytes from the MSB side of the buffer.
    #[inline]
    fn flush_bytes(&mut self) -> Result<()> {
        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer >> (self.bits_in_buffer - 8)) as u8;
            self.writer.write_all(&[byte]).map_err(AhedError::write)?;
            self.bits_in_buffer -= 8;
            self.bytes_written += 1;
        }
        self.buffer &= (1u64 << self.bits_in_buffer) - 1;
        Ok(())
    }

    /// Write up to 32 bits to the stream.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write; only the low `count` bits are used,
    ///   most significant first
    /// * `count` - Number of bits to write (0-32)
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return Ok(());
        }

        let mask = (1u64 << count) - 1;
        self.buffer = (self.buffer << count) | (value as u64 & mask);
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes()
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Write an 8-bit literal symbol, most significant bit first.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_bits(byte as u32, 8)
    }

    /// Pad to byte boundary with zeros.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_buffer % 8 != 0 {
            let padding = 8 - (self.bits_in_buffer % 8);
            self.write_bits(0, padding)?;
        }
        Ok(())
    }

    /// Flush any remaining bits to the underlying writer.
    ///
    /// If there are partial bits, they are padded with zeros to complete
    /// the final byte.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.writer.flush().map_err(AhedError::write)
    }
}
