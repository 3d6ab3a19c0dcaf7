//! Archive serialization.
//!
//! Tables are written front to back with placeholder offsets, which are
//! backpatched once the section they point at has been written.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use gflx_common::{IntoBytes, WriteExt};
use tracing::{debug, trace};

use crate::archive::GfpakArchive;
use crate::format::{
    FileEntryHeader, FolderHeader, HashIndexRecord, PackHeader, BLOCK_ALIGNMENT,
};
use crate::{Error, Result};

impl GfpakArchive {
    /// Serialize the archive to `writer`.
    ///
    /// Offsets in the output are absolute, so `writer` should be positioned
    /// at the start of the stream. Pending content-handler edits are saved
    /// first and indices are regenerated.
    pub fn write_to<W: Write + Seek>(&mut self, writer: &mut W) -> Result<()> {
        self.regenerate_indices();
        for entry in &mut self.files {
            entry.flush_handler()?;
            entry.prepare_payload()?;
        }

        let header = PackHeader {
            magic: PackHeader::MAGIC,
            version: self.version,
            padding: 0,
            file_count: table_len(self.files.len(), "file entries")?,
            folder_count: table_len(self.folders.len(), "folders")? as i32,
            file_info_offset: 0,
            hash_array_offset: 0,
            folder_array_offset: 0,
        };
        writer.write_all(header.as_bytes())?;
        // The header's last field is the first slot of the folder-offset table
        for _ in 1..self.folders.len().max(1) {
            writer.write_u64::<LittleEndian>(0)?;
        }

        writer.patch_offset_here(PackHeader::HASH_ARRAY_OFFSET_FIELD)?;
        for entry in &self.files {
            writer.write_u64::<LittleEndian>(entry.path_hash())?;
        }

        let mut folder_offsets = Vec::with_capacity(self.folders.len());
        for folder in &self.folders {
            folder_offsets.push(writer.position()?);
            let record = FolderHeader {
                hash: folder.hash(),
                file_count: table_len(folder.len(), "folder files")?,
                padding: folder.padding(),
            };
            writer.write_all(record.as_bytes())?;

            for index in folder.files() {
                let record = HashIndexRecord {
                    hash: index.hash,
                    index: index.index,
                    padding: index.padding,
                };
                writer.write_all(record.as_bytes())?;
            }
        }
        for (i, &offset) in folder_offsets.iter().enumerate() {
            writer.patch_u64(PackHeader::FOLDER_TABLE_OFFSET + i as u64 * 8, offset)?;
        }

        let file_info_offset = writer.patch_offset_here(PackHeader::FILE_INFO_OFFSET_FIELD)?;
        let mut data_offset_fields = Vec::with_capacity(self.files.len());
        for entry in &self.files {
            let header_start = writer.position()?;
            let record = FileEntryHeader {
                level: entry.level(),
                codec: entry.codec() as u16,
                decompressed_size: entry.decompressed_size(),
                compressed_size: entry.compressed_size().unwrap_or(0),
                padding: entry.padding(),
                data_offset: 0,
            };
            writer.write_all(record.as_bytes())?;
            data_offset_fields.push(header_start + FileEntryHeader::DATA_OFFSET_FIELD);
        }

        for (entry, &field) in self.files.iter_mut().zip(&data_offset_fields) {
            writer.align(BLOCK_ALIGNMENT)?;
            writer.patch_offset_here(field)?;
            let payload = entry.prepare_payload()?;
            writer.write_all(payload)?;
            let size = payload.len();
            trace!(name = entry.name(), size, "wrote payload");
        }

        let end = writer.align(BLOCK_ALIGNMENT)?;
        writer.flush()?;

        debug!(
            archive = %self.name,
            files = self.files.len(),
            folders = self.folders.len(),
            file_info_offset,
            size = end,
            "wrote GFPAK archive"
        );
        Ok(())
    }

    /// Serialize the archive into a new buffer.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Serialize the archive to a file, replacing it if it exists.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }
}

/// Convert a table length to its on-disk width.
fn table_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|&n| n <= i32::MAX as u32)
        .ok_or_else(|| Error::InvalidStructure(format!("too many {what}: {len}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Codec;

    #[test]
    fn test_empty_archive_layout() {
        let bytes = GfpakArchive::new("empty.gfpak").to_bytes().unwrap();

        // Header only; its last field is the single reserved folder slot
        assert_eq!(bytes.len(), 0x30);
        assert_eq!(&bytes[..8], b"GFLXPACK");
        assert_eq!(&bytes[0x08..0x0C], &0x1000i32.to_le_bytes());
        assert_eq!(&bytes[0x18..0x20], &0x30u64.to_le_bytes());
        assert_eq!(&bytes[0x20..0x28], &0x30u64.to_le_bytes());
        assert_eq!(&bytes[0x28..0x30], &0u64.to_le_bytes());
    }

    #[test]
    fn test_blocks_are_aligned() {
        let mut archive = GfpakArchive::new("aligned.gfpak");
        archive.add_file_with(
            "a/x.bin",
            vec![1; 3],
            crate::AddOptions {
                codec: Codec::None,
                level: 0,
            },
        );
        archive.add_file("b/y.bin", vec![2; 5]);
        let bytes = archive.to_bytes().unwrap();

        assert_eq!(bytes.len() % 16, 0);

        let file_info = u64::from_le_bytes(bytes[0x18..0x20].try_into().unwrap()) as usize;
        for i in 0..2 {
            let field = file_info + i * 24 + 16;
            let offset = u64::from_le_bytes(bytes[field..field + 8].try_into().unwrap());
            assert_eq!(offset % 16, 0);
        }

        // Two folders: both slots of the offset table are filled
        let first = u64::from_le_bytes(bytes[0x28..0x30].try_into().unwrap());
        let second = u64::from_le_bytes(bytes[0x30..0x38].try_into().unwrap());
        assert_eq!(second, first + 32);
    }
}
