//! Common utilities for gflx.
//!
//! This crate provides the foundational pieces shared by the gflx crates:
//!
//! - [`BinaryReader`] - Bounds-checked, zero-copy reading from byte slices
//! - [`WriteExt`] - Little-endian stream writing with alignment and backpatching
//! - [`fnv`] - FNV-64a hashing, the identifier hash of GFPAK archives

mod error;
mod reader;
mod writer;

pub mod fnv;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::WriteExt;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
