//! GFPAK archive model: parsing, lookup and mutation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use gflx_common::BinaryReader;
use memmap2::Mmap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::codec::{self, Codec, DEFAULT_LEVEL};
use crate::dictionary::FilenameDictionary;
use crate::entry::{EntryInfo, FileEntry};
use crate::folder::{Folder, HashIndex};
use crate::format::{FileEntryHeader, FolderHeader, HashIndexRecord, PackHeader};
use crate::handler::{ContentHandler, HandlerRegistry};
use crate::path::PathHashes;
use crate::recovery::{recover_name, EntryHashes};
use crate::{Error, Result};

/// Compression settings for [`GfpakArchive::add_file_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Codec for the new payload
    pub codec: Codec,
    /// Compression level hint
    pub level: u16,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            codec: Codec::Lz4,
            level: DEFAULT_LEVEL,
        }
    }
}

/// An in-memory GFPAK archive.
///
/// Folders own hash indices; entries refer back to their folder by
/// position. The index stored in each [`HashIndex`] always equals the
/// position of its entry in [`GfpakArchive::entries`].
#[derive(Debug)]
pub struct GfpakArchive {
    pub(crate) name: String,
    pub(crate) version: i32,
    pub(crate) folders: Vec<Folder>,
    pub(crate) files: Vec<FileEntry>,
}

/// Where a triple from the folder table lives.
#[derive(Debug, Clone, Copy)]
struct Slot {
    folder: usize,
    hash: u64,
}

impl GfpakArchive {
    /// Create an empty archive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: PackHeader::DEFAULT_VERSION,
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Open an archive from disk, recovering names with the bundled dictionary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let name = file_name(path.as_ref());
        let dictionary = FilenameDictionary::bundled_for(&name);
        Self::open_with(path, &dictionary)
    }

    /// Open an archive from disk with a caller-supplied dictionary.
    pub fn open_with<P: AsRef<Path>>(path: P, dictionary: &FilenameDictionary) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        Self::parse_with(&mmap, file_name(path), dictionary)
    }

    /// Read an archive from any byte source.
    pub fn from_reader<R: Read>(reader: R, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let dictionary = FilenameDictionary::bundled_for(&name);
        Self::from_reader_with(reader, name, &dictionary)
    }

    /// Read an archive from any byte source with a caller-supplied dictionary.
    pub fn from_reader_with<R: Read>(
        mut reader: R,
        name: impl Into<String>,
        dictionary: &FilenameDictionary,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse_with(&data, name, dictionary)
    }

    /// Parse an in-memory archive image.
    pub fn parse(data: &[u8], name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let dictionary = FilenameDictionary::bundled_for(&name);
        Self::parse_with(data, name, &dictionary)
    }

    /// Parse an in-memory archive image with a caller-supplied dictionary.
    pub fn parse_with(
        data: &[u8],
        name: impl Into<String>,
        dictionary: &FilenameDictionary,
    ) -> Result<Self> {
        let name = name.into();
        let mut reader = BinaryReader::new(data);

        reader.expect_magic(&PackHeader::MAGIC)?;
        reader.seek(0)?;

        let header: PackHeader = reader.read_struct()?;
        let version = header.version;
        let file_count = header.file_count as usize;
        let folder_count = usize::try_from(header.folder_count).map_err(|_| {
            Error::InvalidStructure(format!("negative folder count {}", { header.folder_count }))
        })?;

        // The folder-offset table starts at the header's last field
        reader.seek(PackHeader::FOLDER_TABLE_OFFSET)?;
        let folder_offsets = reader.read_u64_array(folder_count)?;

        let (folders, slots) = Self::read_folders(&mut reader, &folder_offsets, file_count)?;
        debug!(folders = folders.len(), triples = slots.len(), "parsed folder table");

        reader.seek(header.hash_array_offset)?;
        let path_hashes = reader.read_u64_array(file_count)?;

        reader.seek(header.file_info_offset)?;
        let mut files = Vec::with_capacity(file_count);
        for (i, &path_hash) in path_hashes.iter().enumerate() {
            let record: FileEntryHeader = reader.read_struct()?;
            let slot = slots.get(&(i as i32)).copied().ok_or_else(|| {
                Error::InvalidStructure(format!("no folder references file entry {i}"))
            })?;
            let codec = Codec::try_from(record.codec).map_err(Error::UnsupportedCodec)?;

            let payload = slice_payload(
                data,
                record.data_offset,
                u64::from(record.compressed_size),
            )?;
            let decompressed =
                codec::decompress(payload, codec, record.decompressed_size as usize)?;

            let hashes = EntryHashes {
                full_path: path_hash,
                folder: folders[slot.folder].hash(),
                file: slot.hash,
            };
            let recovered = recover_name(dictionary, hashes, &decompressed)?;
            trace!(
                index = i,
                name = %recovered.path,
                %codec,
                size = { record.decompressed_size },
                "parsed file entry"
            );

            files.push(FileEntry::packed(
                recovered.path,
                path_hash,
                slot.folder,
                slot.hash,
                i as i32,
                codec,
                record.level,
                record.padding,
                record.decompressed_size,
                payload.to_vec(),
            ));
        }

        debug!(archive = %name, version, files = files.len(), "parsed GFPAK archive");

        Ok(Self {
            name,
            version,
            folders,
            files,
        })
    }

    /// Read every folder record and index its triples by entry position.
    fn read_folders(
        reader: &mut BinaryReader<'_>,
        offsets: &[u64],
        file_count: usize,
    ) -> Result<(Vec<Folder>, FxHashMap<i32, Slot>)> {
        let mut folders = Vec::with_capacity(offsets.len());
        let mut slots = FxHashMap::default();

        for (folder_idx, &offset) in offsets.iter().enumerate() {
            reader.seek(offset)?;
            let header: FolderHeader = reader.read_struct()?;
            let mut folder = Folder::with_padding(header.hash, header.padding);

            for _ in 0..header.file_count {
                let record: HashIndexRecord = reader.read_struct()?;
                let index = record.index;
                if index < 0 || index as usize >= file_count {
                    return Err(Error::InvalidStructure(format!(
                        "folder {folder_idx} references file entry {index} of {file_count}"
                    )));
                }
                let slot = Slot {
                    folder: folder_idx,
                    hash: record.hash,
                };
                if slots.insert(index, slot).is_some() {
                    return Err(Error::InvalidStructure(format!(
                        "file entry {index} is referenced more than once"
                    )));
                }
                folder.push(HashIndex {
                    hash: record.hash,
                    folder: folder_idx,
                    index,
                    padding: record.padding,
                });
            }

            folders.push(folder);
        }

        Ok((folders, slots))
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the format version.
    #[inline]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Get the folders in table order.
    #[inline]
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Get the entries in table order.
    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.files
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.files.len()
    }

    /// Get an entry by position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }

    /// Get a mutable entry by position.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut FileEntry> {
        self.files.get_mut(index)
    }

    /// Find an entry by logical path (case-insensitive, either separator).
    pub fn find(&self, path: &str) -> Option<&FileEntry> {
        self.find_index(path).map(|i| &self.files[i])
    }

    /// Position of the entry with the given logical path.
    pub fn find_index(&self, path: &str) -> Option<usize> {
        let normalized = path.replace('\\', "/");
        self.files
            .iter()
            .position(|e| e.name().eq_ignore_ascii_case(&normalized))
    }

    /// Find an entry by its full-path hash.
    pub fn find_by_hash(&self, path_hash: u64) -> Option<&FileEntry> {
        self.find_index_by_hash(path_hash).map(|i| &self.files[i])
    }

    /// Position of the entry with the given full-path hash.
    pub fn find_index_by_hash(&self, path_hash: u64) -> Option<usize> {
        self.files.iter().position(|e| e.path_hash() == path_hash)
    }

    /// The hash index that owns the entry at `index`.
    pub fn hash_index_of(&self, index: usize) -> Option<&HashIndex> {
        let entry = self.files.get(index)?;
        self.folders.get(entry.folder())?.by_index(entry.link())
    }

    /// Flat descriptions of every entry, in table order.
    pub fn infos(&self) -> impl Iterator<Item = EntryInfo> + '_ {
        self.files.iter().map(|e| {
            let folder_hash = self.folders.get(e.folder()).map_or(0, Folder::hash);
            e.info(folder_hash)
        })
    }

    /// Get the decompressed payload of the entry at `index`.
    pub fn read(&mut self, index: usize) -> Result<&[u8]> {
        self.entry_mut(index)?.data()
    }

    /// Add a file with the default codec (LZ4, level 9).
    ///
    /// See [`GfpakArchive::add_file_with`].
    pub fn add_file(&mut self, path: &str, data: Vec<u8>) -> usize {
        self.add_file_with(path, data, AddOptions::default())
    }

    /// Add a file under a logical path and return its position.
    ///
    /// Hex-literal directory or file names and a `[FullHash=...]` marker
    /// are taken as the hashes themselves. Adding a path whose folder and
    /// file hashes already exist replaces that entry in place.
    pub fn add_file_with(&mut self, path: &str, data: Vec<u8>, options: AddOptions) -> usize {
        let hashes = PathHashes::from_logical_path(path);
        let name = path.replace('\\', "/");

        let folder = match self.folders.iter().position(|f| f.hash() == hashes.directory) {
            Some(folder) => folder,
            None => {
                self.folders.push(Folder::new(hashes.directory));
                self.folders.len() - 1
            }
        };

        let existing = self.folders[folder].by_hash(hashes.file).and_then(|slot| {
            self.files
                .iter()
                .position(|e| e.folder() == folder && e.link() == slot.index)
        });
        if let Some(position) = existing {
            debug!(path = %name, position, "replacing existing entry");
            self.files[position].replace(
                name,
                hashes.full_path,
                options.codec,
                options.level,
                data,
            );
            return position;
        }

        let position = self.files.len();
        let link = position as i32;
        self.folders[folder].push(HashIndex::new(hashes.file, folder, link));
        self.files.push(FileEntry::unpacked(
            name,
            hashes.full_path,
            folder,
            hashes.file,
            link,
            options.codec,
            options.level,
            data,
        ));
        trace!(path, position, folder, "added file entry");
        position
    }

    /// Replace the payload of the entry at `index`.
    pub fn replace_file(&mut self, index: usize, data: Vec<u8>) -> Result<()> {
        self.entry_mut(index)?.set_data(data);
        Ok(())
    }

    /// Remove the entry at `index` and its hash index.
    ///
    /// Remaining indices are regenerated; folders left empty are kept.
    pub fn delete_file(&mut self, index: usize) -> Result<FileEntry> {
        let link = self.entry_mut(index)?.link();
        for folder in &mut self.folders {
            folder.files_mut().retain(|h| h.index != link);
        }

        let entry = self.files.remove(index);
        self.regenerate_indices();
        debug!(path = entry.name(), "deleted file entry");
        Ok(entry)
    }

    /// Renumber hash indices to match entry positions.
    ///
    /// Indices owned by no entry are dropped. Calling this on a consistent
    /// archive changes nothing.
    pub fn regenerate_indices(&mut self) {
        let renumber: FxHashMap<i32, i32> = self
            .files
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.link(), position as i32))
            .collect();

        for folder in &mut self.folders {
            folder.files_mut().retain_mut(|h| match renumber.get(&h.index) {
                Some(&position) => {
                    h.index = position;
                    true
                }
                None => false,
            });
        }

        for (position, entry) in self.files.iter_mut().enumerate() {
            entry.set_link(position as i32);
        }
    }

    /// Open the entry at `index` with a registered content handler.
    pub fn open_content(
        &mut self,
        index: usize,
        registry: &HandlerRegistry,
    ) -> Result<&mut dyn ContentHandler> {
        self.entry_mut(index)?.open_content(registry)
    }

    /// Drop every decompressed buffer that can be rebuilt from its packed payload.
    pub fn release_all(&mut self) -> usize {
        self.files.iter_mut().map(FileEntry::release).filter(|&r| r).count()
    }

    /// Tear down the archive, dropping every folder and entry.
    pub fn unload(&mut self) {
        debug!(archive = %self.name, files = self.files.len(), "unloading archive");
        self.files.clear();
        self.folders.clear();
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut FileEntry> {
        self.files
            .get_mut(index)
            .ok_or_else(|| Error::EntryNotFound(format!("entry #{index}")))
    }
}

/// Slice a payload out of the archive image.
fn slice_payload(data: &[u8], offset: u64, length: u64) -> Result<&[u8]> {
    let out_of_bounds = || Error::OutOfBounds {
        what: "payload",
        offset,
        length,
        size: data.len(),
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = usize::try_from(length)
        .ok()
        .and_then(|len| start.checked_add(len))
        .ok_or_else(out_of_bounds)?;
    data.get(start..end).ok_or_else(out_of_bounds)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
