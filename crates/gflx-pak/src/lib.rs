//! GFPAK (`GFLXPACK`) archive reader and writer.
//!
//! GFPAK is a hash-indexed container used to bundle game assets. It never
//! stores file names, only FNV-64a hashes of directories, file names and
//! full paths. This crate:
//!
//! - Parses and writes the header, folder table, hash-path array and
//!   file-entry table
//! - Decompresses and compresses payloads per entry (stored, zlib, LZ4)
//! - Recovers readable names from a wordlist dictionary, embedded
//!   container names and content sniffing, falling back to hex hashes
//!   that still round-trip exactly
//! - Adds, replaces and deletes entries while keeping the hash indices
//!   consistent
//! - Hands entries to external content handlers and saves their edits
//!
//! # Example
//!
//! ```no_run
//! use gflx_pak::GfpakArchive;
//!
//! let mut archive = GfpakArchive::open("pm0025_00_00.gfpak")?;
//!
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name(), entry.decompressed_size());
//! }
//!
//! // Payloads are decompressed on first access
//! let data = archive.read(0)?.to_vec();
//!
//! archive.add_file("bin/extra/readme.txt", data);
//! archive.save("patched.gfpak")?;
//! # Ok::<(), gflx_pak::Error>(())
//! ```

mod archive;
mod entry;
mod error;
mod folder;
mod handler;
mod writer;

pub mod codec;
pub mod dictionary;
pub mod format;
pub mod path;
pub mod recovery;
pub mod sniff;

pub use archive::{AddOptions, GfpakArchive};
pub use codec::Codec;
pub use dictionary::{DictionaryConfig, FilenameDictionary};
pub use entry::{EntryInfo, FileEntry};
pub use error::{Error, ErrorKind, Result};
pub use folder::{Folder, HashIndex};
pub use handler::{ContentHandler, ContentOpener, HandlerRegistry};
pub use path::PathHashes;
