//! File entries.

use std::fmt;

use crate::codec::{self, Codec};
use crate::format::PADDING;
use crate::handler::{ContentHandler, HandlerRegistry};
use crate::path::extension_of;
use crate::Result;

/// One file stored in a GFPAK archive.
///
/// An entry holds its payload packed, unpacked, or both. Entries read
/// from disk start out packed and are decompressed on first access to
/// [`FileEntry::data`]; entries added in memory start out unpacked and
/// are compressed when the archive is written.
pub struct FileEntry {
    /// Recovered or caller-supplied logical path.
    name: String,
    /// Full-path hash.
    path_hash: u64,
    /// Owning folder position.
    folder: usize,
    /// File-name hash, mirrored from the owning [`crate::HashIndex`].
    file_hash: u64,
    /// Index correlating this entry with its hash index.
    link: i32,
    codec: Codec,
    level: u16,
    padding: u32,
    decompressed_size: u32,
    /// Payload as stored, valid for `codec` and `level`.
    packed: Option<Vec<u8>>,
    /// Decompressed payload.
    content: Option<Vec<u8>>,
    pub(crate) handler: Option<Box<dyn ContentHandler>>,
}

/// Flat description of an entry, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntryInfo {
    /// Logical path
    pub name: String,
    /// Extension with leading dot, or empty
    pub extension: String,
    /// Full-path hash
    pub path_hash: u64,
    /// Directory hash
    pub folder_hash: u64,
    /// File-name hash
    pub file_hash: u64,
    /// Compression codec
    pub codec: Codec,
    /// Compression level
    pub level: u16,
    /// Size when decompressed
    pub decompressed_size: u32,
    /// Size as stored, if the entry has been packed
    pub compressed_size: Option<u32>,
}

impl FileEntry {
    /// Entry read from an archive table, still packed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn packed(
        name: String,
        path_hash: u64,
        folder: usize,
        file_hash: u64,
        link: i32,
        codec: Codec,
        level: u16,
        padding: u32,
        decompressed_size: u32,
        packed: Vec<u8>,
    ) -> Self {
        Self {
            name,
            path_hash,
            folder,
            file_hash,
            link,
            codec,
            level,
            padding,
            decompressed_size,
            packed: Some(packed),
            content: None,
            handler: None,
        }
    }

    /// Entry created in memory, not yet packed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn unpacked(
        name: String,
        path_hash: u64,
        folder: usize,
        file_hash: u64,
        link: i32,
        codec: Codec,
        level: u16,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name,
            path_hash,
            folder,
            file_hash,
            link,
            codec,
            level,
            padding: PADDING,
            decompressed_size: data.len() as u32,
            packed: None,
            content: Some(data),
            handler: None,
        }
    }

    /// Get the logical path.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension of the logical path, ignoring any `[FullHash=...]` marker.
    #[inline]
    pub fn extension(&self) -> &str {
        extension_of(&self.name)
    }

    /// Get the full-path hash.
    #[inline]
    pub fn path_hash(&self) -> u64 {
        self.path_hash
    }

    /// Get the file-name hash.
    #[inline]
    pub fn file_hash(&self) -> u64 {
        self.file_hash
    }

    /// Position of the owning folder in [`crate::GfpakArchive::folders`].
    #[inline]
    pub fn folder(&self) -> usize {
        self.folder
    }

    /// Index shared with the owning [`crate::HashIndex`].
    #[inline]
    pub fn link(&self) -> i32 {
        self.link
    }

    #[inline]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    #[inline]
    pub fn level(&self) -> u16 {
        self.level
    }

    #[inline]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Size of the payload after decompression.
    #[inline]
    pub fn decompressed_size(&self) -> u32 {
        self.decompressed_size
    }

    /// Size of the packed payload, if the entry currently has one.
    pub fn compressed_size(&self) -> Option<u32> {
        self.packed.as_ref().map(|p| p.len() as u32)
    }

    /// Check whether the decompressed payload is resident.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Get the decompressed payload, decompressing it on first access.
    pub fn data(&mut self) -> Result<&[u8]> {
        if self.content.is_none() {
            let packed = self.packed.as_deref().unwrap_or_default();
            let data = codec::decompress(packed, self.codec, self.decompressed_size as usize)?;
            self.content = Some(data);
        }
        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// Replace the payload. It is recompressed when the archive is written.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.decompressed_size = data.len() as u32;
        self.content = Some(data);
        self.packed = None;
    }

    /// Change how the payload is compressed on the next write.
    pub fn set_compression(&mut self, codec: Codec, level: u16) -> Result<()> {
        if codec == self.codec && level == self.level {
            return Ok(());
        }
        self.data()?;
        self.codec = codec;
        self.level = level;
        self.packed = None;
        Ok(())
    }

    /// Drop the decompressed payload if the packed one can rebuild it.
    ///
    /// Entries with an open content handler keep their payload. Returns
    /// whether anything was released.
    pub fn release(&mut self) -> bool {
        if self.packed.is_some() && self.handler.is_none() && self.content.is_some() {
            self.content = None;
            return true;
        }
        false
    }

    /// Open the payload with the opener registered for this entry's extension.
    ///
    /// The handler stays attached to the entry; its edits are saved back
    /// when the archive is written.
    pub fn open_content(&mut self, registry: &HandlerRegistry) -> Result<&mut dyn ContentHandler> {
        let opener = registry.find(extension_of(&self.name))?;
        let name = self.name.clone();
        let handler = opener.open(&name, self.data()?)?;
        Ok(self.handler.insert(handler).as_mut())
    }

    /// Get the attached content handler, if any.
    pub fn handler_mut(&mut self) -> Option<&mut (dyn ContentHandler + 'static)> {
        self.handler.as_deref_mut()
    }

    /// Detach the content handler without saving it.
    pub fn close_content(&mut self) -> Option<Box<dyn ContentHandler>> {
        self.handler.take()
    }

    /// Pull pending edits from the content handler into the payload.
    pub(crate) fn flush_handler(&mut self) -> Result<()> {
        if let Some(handler) = self.handler.as_mut() {
            if let Some(data) = handler.save()? {
                self.set_data(data);
            }
        }
        Ok(())
    }

    /// Packed payload for the current codec and level, compressing if needed.
    pub(crate) fn prepare_payload(&mut self) -> Result<&[u8]> {
        if self.packed.is_none() {
            let (codec, level) = (self.codec, self.level);
            let packed = codec::compress(self.data()?, codec, level)?;
            self.packed = Some(packed);
        }
        Ok(self.packed.as_deref().unwrap_or_default())
    }

    /// Apply a last-wins replacement from `add_file`.
    pub(crate) fn replace(
        &mut self,
        name: String,
        path_hash: u64,
        codec: Codec,
        level: u16,
        data: Vec<u8>,
    ) {
        self.name = name;
        self.path_hash = path_hash;
        self.codec = codec;
        self.level = level;
        self.handler = None;
        self.set_data(data);
    }

    pub(crate) fn set_link(&mut self, link: i32) {
        self.link = link;
    }

    pub(crate) fn info(&self, folder_hash: u64) -> EntryInfo {
        EntryInfo {
            name: self.name.clone(),
            extension: self.extension().to_string(),
            path_hash: self.path_hash,
            folder_hash,
            file_hash: self.file_hash,
            codec: self.codec,
            level: self.level,
            decompressed_size: self.decompressed_size,
            compressed_size: self.compressed_size(),
        }
    }
}

impl fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEntry")
            .field("name", &self.name)
            .field("path_hash", &format_args!("{:#018x}", self.path_hash))
            .field("folder", &self.folder)
            .field("file_hash", &format_args!("{:#018x}", self.file_hash))
            .field("link", &self.link)
            .field("codec", &self.codec)
            .field("level", &self.level)
            .field("decompressed_size", &self.decompressed_size)
            .field("compressed_size", &self.compressed_size())
            .field("loaded", &self.is_loaded())
            .field("handler", &self.handler.as_ref().map(|h| h.extension().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(data: &[u8]) -> FileEntry {
        FileEntry::unpacked(
            "dir/a.bin".to_string(),
            1,
            0,
            2,
            0,
            Codec::Lz4,
            9,
            data.to_vec(),
        )
    }

    #[test]
    fn test_lazy_decompression() {
        let payload = b"lazy lazy lazy lazy payload".to_vec();
        let packed = codec::compress(&payload, Codec::Zlib, 9).unwrap();
        let mut entry = FileEntry::packed(
            "dir/a.bin".to_string(),
            1,
            0,
            2,
            0,
            Codec::Zlib,
            9,
            PADDING,
            payload.len() as u32,
            packed,
        );

        assert!(!entry.is_loaded());
        assert_eq!(entry.data().unwrap(), payload.as_slice());
        assert!(entry.is_loaded());
        assert!(entry.release());
        assert!(!entry.is_loaded());
        assert_eq!(entry.data().unwrap(), payload.as_slice());
    }

    #[test]
    fn test_prepare_payload_caches() {
        let mut entry = added(&[3u8; 64]);
        assert_eq!(entry.compressed_size(), None);
        // Nothing to rebuild from yet
        assert!(!entry.release());

        let packed = entry.prepare_payload().unwrap().to_vec();
        assert_eq!(entry.compressed_size(), Some(packed.len() as u32));

        entry.set_compression(Codec::None, 0).unwrap();
        assert_eq!(entry.compressed_size(), None);
        assert_eq!(entry.prepare_payload().unwrap(), &[3u8; 64]);
    }

    #[test]
    fn test_set_data_invalidates_packed() {
        let mut entry = added(b"one");
        entry.prepare_payload().unwrap();
        entry.set_data(b"two two".to_vec());

        assert_eq!(entry.decompressed_size(), 7);
        assert_eq!(entry.compressed_size(), None);
        assert_eq!(entry.data().unwrap(), b"two two");
    }

    #[test]
    fn test_prepare_payload_reuses_packed() {
        let payload = vec![5u8; 300];
        let packed = codec::compress(&payload, Codec::Lz4, 9).unwrap();
        let mut entry = FileEntry::packed(
            "dir/a.bin".to_string(),
            1,
            0,
            2,
            0,
            Codec::Lz4,
            9,
            PADDING,
            payload.len() as u32,
            packed.clone(),
        );

        assert_eq!(entry.prepare_payload().unwrap(), packed.as_slice());
        assert!(!entry.is_loaded());
    }

    #[test]
    fn test_prepare_payload_compresses_with_entry_codec() {
        let payload = vec![b'x'; 512];
        let mut entry = FileEntry::unpacked(
            "dir/a.bin".to_string(),
            1,
            0,
            2,
            0,
            Codec::Zlib,
            6,
            payload.clone(),
        );

        let packed = entry.prepare_payload().unwrap().to_vec();
        assert!(packed.len() < payload.len());
        assert_eq!(
            codec::decompress(&packed, Codec::Zlib, payload.len()).unwrap(),
            payload
        );
    }

    #[test]
    fn test_extension() {
        assert_eq!(added(b"").extension(), ".bin");
    }
}
