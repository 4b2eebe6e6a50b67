//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! little-endian fields from a byte slice without copying and is the single
//! source of truth for how many bytes have been consumed.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Boundary that variable-length fields are padded out to.
pub const ALIGNMENT: usize = 4;

/// Number of filler bytes that follow `consumed` bytes to reach the next
/// 4-byte boundary.
///
/// ```
/// use cargan_common::alignment_padding;
///
/// assert_eq!(alignment_padding(8), 0);
/// assert_eq!(alignment_padding(9), 3);
/// assert_eq!(alignment_padding(10), 2);
/// assert_eq!(alignment_padding(11), 1);
/// ```
#[inline]
pub const fn alignment_padding(consumed: usize) -> usize {
    (ALIGNMENT - consumed % ALIGNMENT) % ALIGNMENT
}

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// The position is absolute from the start of the slice and only ever moves
/// forward.
///
/// # Example
///
/// ```
/// use cargan_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Advance the position by a number of bytes.
    ///
    /// The skipped bytes are neither validated nor bounds-checked; the
    /// position may move past the end of the buffer.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Skip the filler that pads `consumed` bytes out to a 4-byte boundary.
    ///
    /// Returns the number of bytes skipped. Filler content is not checked.
    #[inline]
    pub fn skip_alignment_padding(&mut self, consumed: usize) -> usize {
        let pad = alignment_padding(consumed);
        self.advance(pad);
        pad
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate. Use the
    /// `little_endian` integer types for multi-byte fields.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }
}
