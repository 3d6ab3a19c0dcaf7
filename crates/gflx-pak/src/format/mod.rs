//! GFPAK on-disk records.
//!
//! These are the fixed-size structures of the format, laid out exactly as
//! they appear in the file. Variable-length parts (folder triples, the
//! hash-path array, payloads) are sequenced by the archive reader and
//! writer.

mod entry;
mod folder;
mod header;

pub use entry::FileEntryHeader;
pub use folder::{FolderHeader, HashIndexRecord};
pub use header::PackHeader;

/// Padding word found after folder headers, hash triples and entry headers.
pub const PADDING: u32 = 0xCC;

/// Alignment of payload blocks and of the final stream length.
pub const BLOCK_ALIGNMENT: u64 = 16;
