//! Decoded payloads produced by the parser.

/// One decoded data chunk.
///
/// This carries the payload, not a reference into the container: ciphered
/// payloads are already deciphered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Resolved or synthesized file name.
    pub name: String,
    /// Offset at which the chunk's tag began.
    pub offset: usize,
    /// Opaque next-offset field, kept as read.
    pub next_offset: u32,
    /// Payload bytes.
    pub data: Vec<u8>,
    /// False when the name was synthesized from the offset.
    pub resolved: bool,
}

impl OutputRecord {
    /// Payload size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Listing row for this record.
    pub fn info(&self) -> RecordInfo {
        RecordInfo {
            name: self.name.clone(),
            offset: self.offset,
            size: self.data.len(),
            resolved: self.resolved,
        }
    }
}

/// Metadata-only view of a record, used for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordInfo {
    /// Resolved or synthesized file name.
    pub name: String,
    /// Offset at which the chunk's tag began.
    pub offset: usize,
    /// Payload size in bytes.
    pub size: usize,
    /// False when the name was synthesized from the offset.
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_describes_record() {
        let record = OutputRecord {
            name: "file-40.extracted".to_string(),
            offset: 40,
            next_offset: 0,
            data: vec![1, 2, 3],
            resolved: false,
        };

        assert_eq!(
            record.info(),
            RecordInfo {
                name: "file-40.extracted".to_string(),
                offset: 40,
                size: 3,
                resolved: false,
            }
        );
    }
}
