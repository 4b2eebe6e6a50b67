//! Common utilities for Cargan.
//!
//! This crate provides the foundational reading primitives shared by the
//! container crates:
//!
//! - [`BinaryReader`] - Bounded, offset-tracking reads from byte slices
//! - [`alignment_padding`] - 4-byte alignment arithmetic used by the format

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::{alignment_padding, BinaryReader, ALIGNMENT};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Re-export zerocopy's little-endian integer types for fixed layouts
pub use zerocopy::byteorder::little_endian;
