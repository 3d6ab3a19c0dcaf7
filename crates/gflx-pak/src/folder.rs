//! Folders and the hash indices they own.

use crate::format::PADDING;

/// A directory inside the archive, identified only by its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    hash: u64,
    padding: u32,
    files: Vec<HashIndex>,
}

/// Link between a folder and one file entry.
///
/// `index` is the position of the owning entry in the file-entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashIndex {
    /// FNV-64a of the file name
    pub hash: u64,
    /// Position of the owning folder in the archive's folder list
    pub folder: usize,
    /// Position of the entry in the file-entry table
    pub index: i32,
    /// Padding word kept for round-trips
    pub padding: u32,
}

impl HashIndex {
    pub(crate) fn new(hash: u64, folder: usize, index: i32) -> Self {
        Self {
            hash,
            folder,
            index,
            padding: PADDING,
        }
    }
}

impl Folder {
    pub(crate) fn new(hash: u64) -> Self {
        Self::with_padding(hash, PADDING)
    }

    pub(crate) fn with_padding(hash: u64, padding: u32) -> Self {
        Self {
            hash,
            padding,
            files: Vec::new(),
        }
    }

    /// Directory hash, `FNV(dir + "/")`.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Hash indices in on-disk order.
    #[inline]
    pub fn files(&self) -> &[HashIndex] {
        &self.files
    }

    /// Number of files in this folder.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find the index owned by entry position `index`.
    pub fn by_index(&self, index: i32) -> Option<&HashIndex> {
        self.files.iter().find(|h| h.index == index)
    }

    /// Find the index for a file-name hash.
    pub fn by_hash(&self, hash: u64) -> Option<&HashIndex> {
        self.files.iter().find(|h| h.hash == hash)
    }

    pub(crate) fn push(&mut self, index: HashIndex) {
        self.files.push(index);
    }

    pub(crate) fn files_mut(&mut self) -> &mut Vec<HashIndex> {
        &mut self.files
    }
}
