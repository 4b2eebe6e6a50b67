//! Error types for the container crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or extracting a container.
///
/// Every structural variant carries the byte offset at which it was detected.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while opening or mapping the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than 16 bytes available for the fixed header.
    #[error("header too short: need {needed} bytes, input has {available}", needed = crate::header::HEADER_SIZE)]
    HeaderTooShort { available: usize },

    /// A fixed-width or declared variable-length field runs past the input.
    #[error("truncated input at offset {offset}: needed {needed} bytes but only {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// An index entry's tag is not the index tag.
    #[error("bad index entry tag at offset {offset}: expected {expected:#010x}, got {tag:#010x}", expected = crate::chunk::TAG_INDEX)]
    BadIndexEntryTag { offset: usize, tag: u32 },

    /// A data chunk declares more payload than the input holds.
    #[error("truncated payload at offset {offset}: declared {declared} bytes but only {available} available")]
    TruncatedPayload {
        offset: usize,
        declared: usize,
        available: usize,
    },

    /// A data-section tag is neither the data tag nor the end sentinel.
    #[error("unknown chunk tag at offset {offset}: {tag:#010x}")]
    UnknownChunkTag { offset: usize, tag: u32 },

    /// Directory creation or file write failed while persisting output.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Byte offset in the container where the error was detected, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedInput { offset, .. }
            | Self::BadIndexEntryTag { offset, .. }
            | Self::TruncatedPayload { offset, .. }
            | Self::UnknownChunkTag { offset, .. } => Some(*offset),
            Self::HeaderTooShort { .. } => Some(0),
            Self::Io(_) | Self::Filesystem { .. } => None,
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl From<cargan_common::Error> for Error {
    fn from(err: cargan_common::Error) -> Self {
        let cargan_common::Error::UnexpectedEof {
            offset,
            needed,
            available,
        } = err;
        Self::TruncatedInput {
            offset,
            needed,
            available,
        }
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;
