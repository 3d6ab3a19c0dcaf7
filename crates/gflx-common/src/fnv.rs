//! FNV-64a hashing utilities.
//!
//! GFPAK archives never store names, only FNV-1a 64-bit hashes of them:
//! directory hashes, file-name hashes and full-path hashes.

/// FNV-64 offset basis.
pub const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-64 prime.
pub const PRIME: u64 = 0x0000_0100_0000_01b3;

/// Incremental FNV-64a hasher.
///
/// Lets callers hash a name and a suffix without concatenating them first.
#[derive(Debug, Clone, Copy)]
pub struct Fnv64a {
    state: u64,
}

impl Fnv64a {
    /// Create a hasher at the offset basis.
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }

    /// Feed bytes into the hash.
    #[inline]
    pub fn update(mut self, data: &[u8]) -> Self {
        for &byte in data {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(PRIME);
        }
        self
    }

    /// Final hash value.
    #[inline]
    pub const fn finish(self) -> u64 {
        self.state
    }
}

impl Default for Fnv64a {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the FNV-64a hash of a byte slice.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u64 {
    Fnv64a::new().update(data).finish()
}

/// Compute the FNV-64a hash of a string's UTF-8 bytes.
#[inline]
pub fn hash_str(s: &str) -> u64 {
    hash_bytes(s.as_bytes())
}
