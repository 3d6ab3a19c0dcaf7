//! Content handler seam.
//!
//! Format decoders live outside this crate. An archive only needs two
//! things from them: a way to open an entry's bytes as some typed
//! content, and a way to get bytes back when that content was edited.

use std::fmt;

use crate::{Error, Result};

/// Content opened from an archive entry.
pub trait ContentHandler {
    /// Extension this handler was opened for, with leading dot.
    fn extension(&self) -> &str;

    /// Re-serialize the content.
    ///
    /// Returns `None` when nothing changed since it was opened; the entry
    /// then keeps its current bytes.
    fn save(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Factory for [`ContentHandler`]s of one or more extensions.
pub trait ContentOpener {
    /// Extensions this opener accepts, with leading dot (e.g. `.bntx`).
    fn extensions(&self) -> &[&'static str];

    /// Open `data`, the decompressed payload of the entry named `name`.
    fn open(&self, name: &str, data: &[u8]) -> Result<Box<dyn ContentHandler>>;
}

/// Registry mapping extensions to openers.
///
/// Openers are tried in registration order; the first one claiming the
/// extension wins.
#[derive(Default)]
pub struct HandlerRegistry {
    openers: Vec<Box<dyn ContentOpener>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an opener.
    pub fn register(&mut self, opener: impl ContentOpener + 'static) -> &mut Self {
        self.openers.push(Box::new(opener));
        self
    }

    /// Find the opener for `extension` (case-insensitive).
    pub fn find(&self, extension: &str) -> Result<&dyn ContentOpener> {
        self.openers
            .iter()
            .find(|opener| {
                opener
                    .extensions()
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .map(|opener| &**opener)
            .ok_or_else(|| Error::NoHandler(extension.to_string()))
    }

    /// Number of registered openers.
    pub fn len(&self) -> usize {
        self.openers.len()
    }

    /// Check if no openers are registered.
    pub fn is_empty(&self) -> bool {
        self.openers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.openers.iter().map(|o| o.extensions()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    struct Raw;

    struct RawContent(Vec<u8>);

    impl ContentHandler for RawContent {
        fn extension(&self) -> &str {
            ".bin"
        }

        fn save(&mut self) -> Result<Option<Vec<u8>>> {
            Ok(Some(self.0.clone()))
        }
    }

    impl ContentOpener for Raw {
        fn extensions(&self) -> &[&'static str] {
            &[".bin", ".dat"]
        }

        fn open(&self, _name: &str, data: &[u8]) -> Result<Box<dyn ContentHandler>> {
            Ok(Box::new(RawContent(data.to_vec())))
        }
    }

    #[test]
    fn test_find_opener() {
        let mut registry = HandlerRegistry::new();
        registry.register(Raw);

        let opener = registry.find(".DAT").unwrap();
        let mut handler = opener.open("a.dat", b"abc").unwrap();
        assert_eq!(handler.save().unwrap().as_deref(), Some(b"abc".as_slice()));
    }

    #[test]
    fn test_missing_opener() {
        let registry = HandlerRegistry::new();
        let err = registry.find(".bntx").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}
