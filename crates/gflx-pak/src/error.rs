//! Error types for the GFPAK crate.

use thiserror::Error;

/// Errors that can occur when working with GFPAK archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (bounds, magic, string decoding).
    #[error("{0}")]
    Common(#[from] gflx_common::Error),

    /// Structurally invalid table contents.
    #[error("invalid archive structure: {0}")]
    InvalidStructure(String),

    /// Decoded payload did not have the declared size.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An offset or length points outside the archive.
    #[error("{what} at {offset:#x} (+{length:#x}) lies outside a {size:#x} byte archive")]
    OutOfBounds {
        what: &'static str,
        offset: u64,
        length: u64,
        size: usize,
    },

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Compression error.
    #[error("compression error: {0}")]
    Compression(String),

    /// Unsupported compression codec tag.
    #[error("unsupported compression codec: {0}")]
    UnsupportedCodec(u16),

    /// Embedded container uses a layout this crate cannot read.
    #[error("unsupported {container} container: {reason}")]
    UnsupportedContainer {
        container: &'static str,
        reason: String,
    },

    /// No content handler is registered for an extension.
    #[error("no content handler registered for extension {0:?}")]
    NoHandler(String),

    /// A content handler failed.
    #[error("content handler error: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic or a structurally invalid table.
    Format,
    /// Size mismatch, out-of-range offset, or undecodable payload.
    CorruptData,
    /// Unknown codec tag or unsupported container sub-version.
    UnsupportedFormat,
    /// Underlying stream failure.
    Io,
    /// A content handler failed.
    Handler,
    /// A lookup found nothing.
    NotFound,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Common(inner) => match inner {
                gflx_common::Error::InvalidMagic { .. } => ErrorKind::Format,
                gflx_common::Error::Io(_) => ErrorKind::Io,
                _ => ErrorKind::CorruptData,
            },
            Error::InvalidStructure(_) => ErrorKind::Format,
            Error::SizeMismatch { .. }
            | Error::OutOfBounds { .. }
            | Error::Decompression(_)
            | Error::Compression(_) => ErrorKind::CorruptData,
            Error::UnsupportedCodec(_)
            | Error::UnsupportedContainer { .. }
            | Error::NoHandler(_) => ErrorKind::UnsupportedFormat,
            Error::Handler(_) => ErrorKind::Handler,
            Error::EntryNotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for GFPAK operations.
pub type Result<T> = std::result::Result<T, Error>;
