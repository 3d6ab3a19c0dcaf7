//! Archive header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// GFPAK file header.
///
/// The three offsets are absolute. The folder-offset table starts at
/// [`PackHeader::FOLDER_TABLE_OFFSET`], so `folder_array_offset` doubles as
/// its first slot: the start of the first folder record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct PackHeader {
    /// `GFLXPACK`
    pub magic: [u8; 8],
    /// Format version
    pub version: i32,
    /// Unused, written as zero
    pub padding: u32,
    /// Number of file entries
    pub file_count: u32,
    /// Number of folders
    pub folder_count: i32,
    /// Offset of the file-entry header table
    pub file_info_offset: u64,
    /// Offset of the full-path hash array
    pub hash_array_offset: u64,
    /// Offset of the first folder record
    pub folder_array_offset: u64,
}

impl PackHeader {
    /// Archive signature.
    pub const MAGIC: [u8; 8] = *b"GFLXPACK";

    /// Version written for new archives.
    pub const DEFAULT_VERSION: i32 = 0x1000;

    /// Offset of the `file_info_offset` field.
    pub const FILE_INFO_OFFSET_FIELD: u64 = 0x18;

    /// Offset of the `hash_array_offset` field.
    pub const HASH_ARRAY_OFFSET_FIELD: u64 = 0x20;

    /// Offset of the folder-offset table (first slot is `folder_array_offset`).
    pub const FOLDER_TABLE_OFFSET: u64 = 0x28;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<PackHeader>(), 0x30);
    }
}
