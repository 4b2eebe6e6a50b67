//! Tag constants and fixed-width entry heads.

use cargan_common::little_endian::U32;
use cargan_common::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Tag of an index table entry.
pub const TAG_INDEX: u32 = 1;

/// Tag of a data chunk.
pub const TAG_DATA: u32 = 2;

/// Tag marking the end of the data section.
pub const TAG_END: u32 = 0xFFFF_FFFF;

/// Bytes between the start of a data chunk's tag and its payload.
pub const DATA_CHUNK_PREFIX: usize = 4 + std::mem::size_of::<DataChunkHead>();

/// Trailer that follows the end tag. Skipped unread.
pub const END_TRAILER: usize = 4;

/// Fixed part of an index entry, followed by `name_length + 1` name bytes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct IndexEntryHead {
    tag: U32,
    data_offset: U32,
    name_length: U32,
}

impl IndexEntryHead {
    /// Entry tag; must be [`TAG_INDEX`].
    #[inline]
    pub fn tag(&self) -> u32 {
        self.tag.get()
    }

    /// Absolute offset of the matching data chunk's tag.
    #[inline]
    pub fn data_offset(&self) -> u32 {
        self.data_offset.get()
    }

    /// Logical name length, excluding the trailing terminator byte.
    #[inline]
    pub fn name_length(&self) -> u32 {
        self.name_length.get()
    }

    /// Bytes the name occupies on disk, terminator included.
    #[inline]
    pub fn stored_name_length(&self) -> usize {
        (self.name_length() as usize).saturating_add(1)
    }
}

/// Fixed part of a data chunk after its tag.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DataChunkHead {
    next_offset: U32,
    payload_length: U32,
}

impl DataChunkHead {
    /// Opaque next-offset field. Not used for navigation.
    #[inline]
    pub fn next_offset(&self) -> u32 {
        self.next_offset.get()
    }

    /// Payload length in bytes.
    #[inline]
    pub fn payload_length(&self) -> u32 {
        self.payload_length.get()
    }
}
