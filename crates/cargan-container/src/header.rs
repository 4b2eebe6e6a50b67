//! Fixed container header and variant selection.

use cargan_common::little_endian::U32;
use cargan_common::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Magic of the plain ("CAR") variant.
pub const MAGIC_CAR: u32 = 0x7261_6301;

/// Magic of the ciphered ("GAN") variant.
pub const MAGIC_GAN: u32 = 0x676e_6101;

/// Fixed 16-byte container header.
///
/// Bytes 4..12 are reserved. Their meaning is unknown, so they are kept
/// verbatim and never interpreted.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ContainerHeader {
    magic: U32,
    reserved: [u8; 8],
    index_count: U32,
}

impl ContainerHeader {
    /// Raw magic number.
    #[inline]
    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    /// Opaque reserved bytes.
    #[inline]
    pub fn reserved(&self) -> [u8; 8] {
        self.reserved
    }

    /// Number of index entries declared by the header.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count.get()
    }

    /// Variant selected by the magic.
    #[inline]
    pub fn variant(&self) -> Variant {
        Variant::from_magic(self.magic())
    }

    /// Whether the magic is one of the two known values.
    #[inline]
    pub fn is_recognized(&self) -> bool {
        matches!(self.magic(), MAGIC_CAR | MAGIC_GAN)
    }
}

/// Container variant, which decides whether payloads pass through the
/// content cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Variant {
    /// Payloads are stored verbatim.
    Plain,
    /// Payloads are XOR-obfuscated with the content key.
    Ciphered,
}

impl Variant {
    /// Select the variant from a magic number.
    ///
    /// Only [`MAGIC_GAN`] selects [`Variant::Ciphered`]; every other value,
    /// including unrecognized ones, reads as [`Variant::Plain`].
    #[inline]
    pub const fn from_magic(magic: u32) -> Self {
        match magic {
            MAGIC_GAN => Self::Ciphered,
            _ => Self::Plain,
        }
    }

    /// Whether payloads must be deciphered.
    #[inline]
    pub const fn is_ciphered(self) -> bool {
        matches!(self, Self::Ciphered)
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Ciphered => "ciphered",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
