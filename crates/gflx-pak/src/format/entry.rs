//! File entry header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed-size header describing one packed payload.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FileEntryHeader {
    /// Compression effort hint (usually 9)
    pub level: u16,
    /// Codec tag, see [`crate::Codec`]
    pub codec: u16,
    /// Size after decompression
    pub decompressed_size: u32,
    /// Size of the payload on disk
    pub compressed_size: u32,
    /// Usually 0xCC
    pub padding: u32,
    /// Absolute offset of the payload
    pub data_offset: u64,
}

impl FileEntryHeader {
    /// Offset of `data_offset` within the header, for backpatching.
    pub const DATA_OFFSET_FIELD: u64 = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<FileEntryHeader>(), 24);
    }
}
