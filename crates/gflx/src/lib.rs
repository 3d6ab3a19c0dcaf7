//! gflx - GFLX game asset container library.
//!
//! This crate provides a unified interface to the gflx library crates.
//!
//! # Crates
//!
//! - [`gflx_common`] - Common utilities (binary reading, stream patching, FNV-64a)
//! - [`gflx_pak`] - GFPAK archive reading, name recovery and writing
//!
//! # Example
//!
//! ```no_run
//! use gflx::prelude::*;
//!
//! let mut archive = GfpakArchive::open("pm0025_00_00.gfpak")?;
//!
//! if let Some(index) = archive.find_index("bin/pokemon/pm0025/pm0025_00_00/mdl/pm0025_00_00.gfbmdl") {
//!     let data = archive.read(index)?;
//!     println!("model: {} bytes", data.len());
//! }
//!
//! let hashes = PathHashes::from_logical_path("bin/field/env/env_main.bin");
//! println!("{:016X}", hashes.full_path);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use gflx_common as common;
pub use gflx_pak as pak;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use gflx_common::{fnv, BinaryReader};
    pub use gflx_pak::{
        AddOptions, Codec, ContentHandler, ContentOpener, DictionaryConfig, FileEntry,
        FilenameDictionary, GfpakArchive, HandlerRegistry, PathHashes,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
