//! Container fixtures for integration tests.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use cargan_container::chunk::{TAG_DATA, TAG_END, TAG_INDEX};
use cargan_container::{cipher, MAGIC_GAN};

/// Filler written into alignment padding. Deliberately non-zero.
pub const PAD_BYTE: u8 = 0xEE;

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

struct Chunk {
    name: Option<String>,
    payload: Vec<u8>,
}

/// Builds container bytes with correct offsets and padding.
pub struct ContainerBuilder {
    magic: u32,
    reserved: [u8; 8],
    chunks: Vec<Chunk>,
    aliases: Vec<(usize, String)>,
    end_marker: bool,
    trailing: Vec<u8>,
}

impl ContainerBuilder {
    pub fn new(magic: u32) -> Self {
        Self {
            magic,
            reserved: *b"\x10\x20\x30\x40\x50\x60\x70\x80",
            chunks: Vec::new(),
            aliases: Vec::new(),
            end_marker: false,
            trailing: Vec::new(),
        }
    }

    /// A chunk with an index entry.
    pub fn file(mut self, name: &str, payload: &[u8]) -> Self {
        self.chunks.push(Chunk {
            name: Some(name.to_string()),
            payload: payload.to_vec(),
        });
        self
    }

    /// A chunk without an index entry.
    pub fn unnamed(mut self, payload: &[u8]) -> Self {
        self.chunks.push(Chunk {
            name: None,
            payload: payload.to_vec(),
        });
        self
    }

    /// An extra index entry for chunk `chunk`, written after the regular ones.
    pub fn alias(mut self, chunk: usize, name: &str) -> Self {
        self.aliases.push((chunk, name.to_string()));
        self
    }

    pub fn end_marker(mut self) -> Self {
        self.end_marker = true;
        self
    }

    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    fn index_entries(&self) -> Vec<(usize, &str)> {
        let mut entries: Vec<(usize, &str)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.name.as_deref().map(|n| (i, n)))
            .collect();
        entries.extend(self.aliases.iter().map(|(i, n)| (*i, n.as_str())));
        entries
    }

    /// Offset of each chunk's tag in the built container.
    pub fn chunk_offsets(&self) -> Vec<usize> {
        let index_len: usize = self
            .index_entries()
            .iter()
            .map(|(_, name)| 12 + name.len() + 1 + padding(name.len() + 1))
            .sum();

        let mut offset = 16 + index_len;
        self.chunks
            .iter()
            .map(|c| {
                let at = offset;
                offset += 12 + c.payload.len() + padding(c.payload.len());
                at
            })
            .collect()
    }

    pub fn build(&self) -> Vec<u8> {
        let offsets = self.chunk_offsets();
        let entries = self.index_entries();
        let mut out = Vec::new();

        out.write_u32::<LittleEndian>(self.magic).unwrap();
        out.extend_from_slice(&self.reserved);
        out.write_u32::<LittleEndian>(entries.len() as u32).unwrap();

        for (chunk, name) in &entries {
            out.write_u32::<LittleEndian>(TAG_INDEX).unwrap();
            out.write_u32::<LittleEndian>(offsets[*chunk] as u32).unwrap();
            out.write_u32::<LittleEndian>(name.len() as u32).unwrap();
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            out.resize(out.len() + padding(name.len() + 1), PAD_BYTE);
        }

        for (i, chunk) in self.chunks.iter().enumerate() {
            assert_eq!(out.len(), offsets[i]);
            let next = offsets.get(i + 1).copied().unwrap_or(0);
            let payload = if self.magic == MAGIC_GAN {
                cipher::encode(&chunk.payload)
            } else {
                chunk.payload.clone()
            };

            out.write_u32::<LittleEndian>(TAG_DATA).unwrap();
            out.write_u32::<LittleEndian>(next as u32).unwrap();
            out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
            out.extend_from_slice(&payload);
            out.resize(out.len() + padding(payload.len()), PAD_BYTE);
        }

        if self.end_marker {
            out.write_u32::<LittleEndian>(TAG_END).unwrap();
            out.write_u32::<LittleEndian>(0xABAB_ABAB).unwrap();
        }
        out.extend_from_slice(&self.trailing);
        out
    }
}
