//! Folder records and their file-hash triples.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed part of a folder record, followed by `file_count` [`HashIndexRecord`]s.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FolderHeader {
    /// FNV-64a of the directory path including its trailing `/`
    pub hash: u64,
    /// Number of triples that follow
    pub file_count: u32,
    /// Usually 0xCC
    pub padding: u32,
}

/// One `(fileHash, index, padding)` triple inside a folder record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct HashIndexRecord {
    /// FNV-64a of the file name
    pub hash: u64,
    /// Position of the owning entry in the file-entry table
    pub index: i32,
    /// Usually 0xCC
    pub padding: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<FolderHeader>(), 16);
        assert_eq!(std::mem::size_of::<HashIndexRecord>(), 16);
    }
}
