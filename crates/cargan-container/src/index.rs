//! Index table: data offsets mapped to logical file names.

use cargan_common::BinaryReader;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::chunk::{IndexEntryHead, TAG_INDEX};
use crate::{Error, Result};

/// One row of the index table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Offset at which this entry began.
    pub offset: usize,
    /// Offset of the data chunk's tag this entry names.
    pub data_offset: u32,
    /// Logical file name.
    pub name: String,
}

/// The index table of one container.
///
/// Entries are kept in read order. Name lookup goes through an offset map in
/// which a later entry replaces an earlier one with the same data offset.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    entries: Vec<IndexEntry>,
    by_offset: FxHashMap<u32, usize>,
}

impl IndexTable {
    /// Read `count` entries starting at the reader's position.
    ///
    /// Leaves the reader on the first byte after the last entry's padding.
    pub fn read(reader: &mut BinaryReader<'_>, count: u32) -> Result<Self> {
        let mut table = Self {
            entries: Vec::with_capacity((count as usize).min(reader.remaining() / 16)),
            by_offset: FxHashMap::default(),
        };

        for _ in 0..count {
            let offset = reader.position();
            let head: IndexEntryHead = reader.read_struct()?;
            if head.tag() != TAG_INDEX {
                return Err(Error::BadIndexEntryTag {
                    offset,
                    tag: head.tag(),
                });
            }

            let stored = head.stored_name_length();
            let raw = reader.read_bytes(stored)?;
            let name = String::from_utf8_lossy(&raw[..stored - 1]).into_owned();
            reader.skip_alignment_padding(stored);

            trace!(offset, data_offset = head.data_offset(), %name, "index entry");
            table.insert(IndexEntry {
                offset,
                data_offset: head.data_offset(),
                name,
            });
        }

        Ok(table)
    }

    /// Append an entry; it wins over any earlier entry at the same data offset.
    pub fn insert(&mut self, entry: IndexEntry) {
        self.by_offset.insert(entry.data_offset, self.entries.len());
        self.entries.push(entry);
    }

    /// Name registered for a data offset.
    pub fn get(&self, data_offset: u32) -> Option<&str> {
        self.by_offset
            .get(&data_offset)
            .map(|&i| self.entries[i].name.as_str())
    }

    /// Name for a chunk that began at `offset`, if one is registered.
    pub fn resolve(&self, offset: usize) -> Option<&str> {
        u32::try_from(offset).ok().and_then(|o| self.get(o))
    }

    /// All entries in read order, shadowed ones included.
    #[inline]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries read.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct data offsets.
    #[inline]
    pub fn distinct_offsets(&self) -> usize {
        self.by_offset.len()
    }
}

/// Name given to a chunk whose offset has no index entry.
pub fn synthesized_name(offset: usize) -> String {
    format!("file-{offset}.extracted")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(data_offset: u32, name: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&TAG_INDEX.to_le_bytes());
        bytes.extend_from_slice(&data_offset.to_le_bytes());
        bytes.extend_from_slice(&(name.len() as u32).to_le_bytes());
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(0);
        while bytes.len() % 4 != 0 {
            bytes.push(0xCC);
        }
        bytes
    }

    #[test]
    fn test_read_entries_and_padding() {
        let mut data = entry(100, "a.bin");
        data.extend(entry(200, "dir/bb.txt"));
        let mut reader = BinaryReader::new(&data);

        let table = IndexTable::read(&mut reader, 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(100), Some("a.bin"));
        assert_eq!(table.get(200), Some("dir/bb.txt"));
        assert_eq!(table.entries()[1].offset, 20);
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn test_later_entry_wins() {
        let mut data = entry(64, "a.bin");
        data.extend(entry(64, "b.bin"));
        let mut reader = BinaryReader::new(&data);

        let table = IndexTable::read(&mut reader, 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.distinct_offsets(), 1);
        assert_eq!(table.resolve(64), Some("b.bin"));
    }

    #[test]
    fn test_bad_tag() {
        let mut data = entry(0, "x");
        data[0] = 2;
        let mut reader = BinaryReader::new(&data);

        match IndexTable::read(&mut reader, 1) {
            Err(Error::BadIndexEntryTag { offset: 0, tag: 2 }) => {}
            other => panic!("expected BadIndexEntryTag, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_name() {
        let data = entry(0, "long-name.bin");
        let mut reader = BinaryReader::new(&data[..16]);

        match IndexTable::read(&mut reader, 1) {
            Err(Error::TruncatedInput { offset: 12, needed: 14, .. }) => {}
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_name_keeps_terminator() {
        let data = entry(8, "");
        assert_eq!(data.len(), 16);
        let mut reader = BinaryReader::new(&data);

        let table = IndexTable::read(&mut reader, 1).unwrap();
        assert_eq!(table.get(8), Some(""));
        assert_eq!(reader.position(), 16);
    }

    #[test]
    fn test_resolve_out_of_range_offset() {
        let table = IndexTable::default();
        assert!(table.is_empty());
        assert_eq!(table.resolve(usize::MAX), None);
        assert_eq!(synthesized_name(48), "file-48.extracted");
    }
}
