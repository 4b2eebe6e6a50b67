//! Container reader.
//!
//! A container is read in three phases: the fixed header is decoded when the
//! container is opened, the index table is read in full when parsing starts,
//! and the data section is then walked lazily one chunk at a time.

use std::fs::File;
use std::iter::FusedIterator;
use std::path::Path;

use cargan_common::{BinaryReader, FromBytes};
use memmap2::Mmap;
use tracing::{debug, trace, warn};

use crate::chunk::{DataChunkHead, DATA_CHUNK_PREFIX, END_TRAILER, TAG_DATA, TAG_END};
use crate::cipher;
use crate::header::{ContainerHeader, Variant, HEADER_SIZE};
use crate::index::{synthesized_name, IndexTable};
use crate::record::OutputRecord;
use crate::{Error, Result};

/// Bytes backing a container.
enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Source {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => mmap,
            Self::Owned(data) => data,
        }
    }
}

/// An opened container with a validated header.
pub struct Container {
    source: Source,
    name: String,
    header: ContainerHeader,
}

impl Container {
    /// Open a container file.
    ///
    /// The file is memory-mapped; nothing beyond the header is read until
    /// [`Container::parse`] is called.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let len = file.metadata()?.len();
        if len < HEADER_SIZE as u64 {
            return Err(Error::HeaderTooShort {
                available: len as usize,
            });
        }

        // SAFETY: the mapping is read-only and lives as long as the container.
        // Concurrent truncation of the file by another process is not guarded
        // against, as with any mapped reader.
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::with_source(Source::Mapped(mmap), name)
    }

    /// Read a container from an owned buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::with_source(Source::Owned(data), "memory".to_string())
    }

    fn with_source(source: Source, name: String) -> Result<Self> {
        let data = source.as_bytes();
        let header = data
            .get(..HEADER_SIZE)
            .and_then(|bytes| ContainerHeader::read_from_bytes(bytes).ok())
            .ok_or(Error::HeaderTooShort {
                available: data.len(),
            })?;

        if !header.is_recognized() {
            warn!(
                magic = format_args!("{:#010x}", header.magic()),
                "unrecognized container magic, reading as plain"
            );
        }
        debug!(
            container = %name,
            variant = %header.variant(),
            index_count = header.index_count(),
            len = data.len(),
            "opened container"
        );

        Ok(Self {
            source,
            name,
            header,
        })
    }

    /// Container name (file name, or `memory` for buffers).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded header.
    #[inline]
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Variant selected by the header magic.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.header.variant()
    }

    /// Total input length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.source.as_bytes().len()
    }

    /// Always false: an opened container holds at least a header.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw container bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    /// Read the index table only.
    pub fn index(&self) -> Result<IndexTable> {
        let mut reader = self.body_reader();
        IndexTable::read(&mut reader, self.header.index_count())
    }

    /// Read the index table and return a lazy iterator over the data section.
    ///
    /// Records come out in data-section order. The iterator stops after the
    /// end marker, at end of input, or after yielding the first error.
    pub fn parse(&self) -> Result<Records<'_>> {
        let mut reader = self.body_reader();
        let index = IndexTable::read(&mut reader, self.header.index_count())?;

        debug!(
            entries = index.len(),
            distinct = index.distinct_offsets(),
            data_start = reader.position(),
            "read index table"
        );

        Ok(Records {
            reader,
            index,
            variant: self.variant(),
            state: State::Running,
        })
    }

    /// Parse every record eagerly.
    pub fn records(&self) -> Result<Vec<OutputRecord>> {
        self.parse()?.collect()
    }

    fn body_reader(&self) -> BinaryReader<'_> {
        let mut reader = BinaryReader::new(self.as_bytes());
        reader.advance(HEADER_SIZE);
        reader
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("header", &self.header)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    EndMarker,
    EndOfInput,
    Failed,
}

/// Lazy iterator over a container's data chunks.
#[derive(Debug)]
pub struct Records<'a> {
    reader: BinaryReader<'a>,
    index: IndexTable,
    variant: Variant,
    state: State,
}

impl<'a> Records<'a> {
    /// Index table read before the data section.
    #[inline]
    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Current offset in the container.
    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Variant of the container being read.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Whether iteration stopped at an explicit end marker.
    #[inline]
    pub fn ended_by_marker(&self) -> bool {
        self.state == State::EndMarker
    }

    /// Whether iteration is over, for any reason.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state != State::Running
    }

    fn next_record(&mut self) -> Result<Option<OutputRecord>> {
        if self.reader.is_empty() {
            self.state = State::EndOfInput;
            return Ok(None);
        }

        let offset = self.reader.position();
        let tag = self.reader.read_u32()?;
        match tag {
            TAG_END => {
                self.reader.advance(END_TRAILER);
                self.state = State::EndMarker;
                trace!(offset, "end marker");
                Ok(None)
            }
            TAG_DATA => self.read_data_chunk(offset).map(Some),
            tag => Err(Error::UnknownChunkTag { offset, tag }),
        }
    }

    fn read_data_chunk(&mut self, offset: usize) -> Result<OutputRecord> {
        let head: DataChunkHead = self.reader.read_struct()?;
        let declared = head.payload_length() as usize;

        let payload_offset = self.reader.position();
        let payload = self
            .reader
            .read_bytes(declared)
            .map_err(|_| Error::TruncatedPayload {
                offset: payload_offset,
                declared,
                available: self.reader.remaining(),
            })?;

        let self_offset = self.reader.position() - declared - DATA_CHUNK_PREFIX;
        debug_assert_eq!(self_offset, offset);

        let (name, resolved) = match self.index.resolve(self_offset) {
            Some(name) => (name.to_string(), true),
            None => (synthesized_name(self_offset), false),
        };

        let mut data = payload.to_vec();
        if self.variant.is_ciphered() {
            cipher::apply_in_place(&mut data);
        }

        trace!(offset = self_offset, size = declared, %name, resolved, "data chunk");
        self.reader.skip_alignment_padding(declared);

        Ok(OutputRecord {
            name,
            offset: self_offset,
            next_offset: head.next_offset(),
            data,
            resolved,
        })
    }
}

impl Iterator for Records<'_> {
    type Item = Result<OutputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Failed;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Records<'_> {}
