//! Best-effort recovery of logical file names.
//!
//! An entry is identified only by hashes, so its name is rebuilt from
//! several sources, most trusted first:
//!
//! 1. a dictionary hit on the full-path hash whose directory and file
//!    hashes agree with the stored ones,
//! 2. the folder name from the dictionary,
//! 3. a name embedded in the payload's own container header,
//! 4. the file name from the dictionary,
//! 5. the hash itself in uppercase hex.
//!
//! Whenever the folder or file falls back to hex, the full-path hash is
//! appended as `[FullHash=<hex>]`, so re-adding the entry under the
//! produced name restores all three hashes.

use gflx_common::fnv::Fnv64a;
use gflx_common::BinaryReader;
use tracing::debug;

use crate::dictionary::FilenameDictionary;
use crate::path::{PathHashes, FULL_HASH_MARKER};
use crate::sniff::{has_embedded_name, sniff_extension};
use crate::{Error, Result};

/// Offset of the byte-order mark in NintendoWare binary headers.
const BOM_OFFSET: u64 = 0x0C;

/// Offset of the file-name offset in NintendoWare binary headers.
const NAME_OFFSET_FIELD: u64 = 0x10;

/// Sibling extensions a shader container may have been stored under.
const SHADER_EXTENSIONS: [&str; 2] = [".bnsh_fsh", ".bnsh_vsh"];

/// Hashes stored for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHashes {
    /// Hash from the hash-path array
    pub full_path: u64,
    /// Hash of the owning folder
    pub folder: u64,
    /// Hash from the owning folder triple
    pub file: u64,
}

/// Outcome of name recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredName {
    /// Logical path, possibly containing a `[FullHash=...]` marker.
    pub path: String,
    /// Sniffed extension (empty if unknown).
    pub extension: &'static str,
    /// The folder name came from the dictionary.
    pub folder_resolved: bool,
    /// The file name came from the dictionary or the payload.
    pub file_resolved: bool,
}

/// Recover the logical path of an entry from its hashes and decompressed bytes.
pub fn recover_name(
    dictionary: &FilenameDictionary,
    hashes: EntryHashes,
    data: &[u8],
) -> Result<RecoveredName> {
    let extension = sniff_extension(data);

    if let Some(path) = full_path_hit(dictionary, hashes) {
        return Ok(RecoveredName {
            path: path.to_string(),
            extension,
            folder_resolved: true,
            file_resolved: true,
        });
    }

    let folder = dictionary
        .lookup(hashes.folder)
        .and_then(|dir| dir.strip_suffix('/'));
    let folder_resolved = folder.is_some();
    let folder = folder.map_or_else(|| format!("{:X}", hashes.folder), str::to_string);

    // (file part, trailing extension): only hex names get the sniffed extension
    let embedded = if has_embedded_name(extension) {
        embedded_name(data, extension)?.filter(|name| !name.is_empty())
    } else {
        None
    };

    let (file, suffix, file_resolved) = if let Some(name) = embedded {
        let extension = if extension == ".bnsh" {
            shader_extension(&name, hashes.file)
        } else {
            extension
        };
        (format!("{name}{extension}"), "", true)
    } else if let Some(name) = dictionary.lookup(hashes.file) {
        (name.to_string(), "", true)
    } else {
        (format!("{:X}", hashes.file), extension, false)
    };

    let path = if folder_resolved && file_resolved {
        format!("{folder}/{file}{suffix}")
    } else {
        debug!(
            folder = %format_args!("{:X}", hashes.folder),
            file = %format_args!("{:X}", hashes.file),
            "name not fully resolved, keeping full hash"
        );
        format!(
            "{folder}/{file}{FULL_HASH_MARKER}{:X}]{suffix}",
            hashes.full_path
        )
    };

    Ok(RecoveredName {
        path,
        extension,
        folder_resolved,
        file_resolved,
    })
}

/// Dictionary hit on the full path, accepted only if it reproduces every stored hash.
fn full_path_hit(dictionary: &FilenameDictionary, hashes: EntryHashes) -> Option<&str> {
    let path = dictionary.lookup(hashes.full_path)?;
    let derived = PathHashes::from_logical_path(path);
    (derived.directory == hashes.folder
        && derived.file == hashes.file
        && derived.logical == path)
        .then_some(path)
}

/// Read the name a NintendoWare container stores for itself.
///
/// Returns `None` for payloads whose header is too short to carry a name.
pub fn embedded_name(data: &[u8], extension: &'static str) -> Result<Option<String>> {
    if extension == ".bfres" && data.get(4..8) != Some(b"    ".as_slice()) {
        return Err(Error::UnsupportedContainer {
            container: extension,
            reason: "big-endian (Wii U) FRES layout".to_string(),
        });
    }

    if data.len() < (NAME_OFFSET_FIELD + 4) as usize {
        return Ok(None);
    }

    let mut reader = BinaryReader::new(data);
    reader.seek(BOM_OFFSET)?;
    if reader.read_bytes(2)? == [0xFE, 0xFF] {
        return Err(Error::UnsupportedContainer {
            container: extension,
            reason: "big-endian byte order".to_string(),
        });
    }

    reader.seek(NAME_OFFSET_FIELD)?;
    let name_offset = reader.read_u32()?;
    reader.seek(u64::from(name_offset))?;
    Ok(Some(reader.read_cstring()?.to_string()))
}

/// Pick the shader sibling extension whose `name + ext` hash matches.
fn shader_extension(name: &str, file_hash: u64) -> &'static str {
    SHADER_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| {
            Fnv64a::new()
                .update(name.as_bytes())
                .update(ext.as_bytes())
                .finish()
                == file_hash
        })
        .unwrap_or(".bnsh")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryConfig;
    use crate::ErrorKind;
    use gflx_common::fnv;

    /// Minimal NintendoWare-style container with an embedded name.
    fn container(magic: &[u8; 8], name: &str) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(magic);
        data.extend_from_slice(&0x0004_0000u32.to_le_bytes());
        data.extend_from_slice(&[0xFF, 0xFE, 0x0C, 0x40]);
        data.extend_from_slice(&0x20u32.to_le_bytes());
        data.resize(0x20, 0);
        data.extend_from_slice(name.as_bytes());
        data.push(0);
        data
    }

    fn dict(wordlist: &'static str) -> FilenameDictionary {
        FilenameDictionary::new(DictionaryConfig::with_wordlist(wordlist))
    }

    #[test]
    fn test_unresolved_hex_fallback() {
        let hashes = EntryHashes {
            full_path: 0xABCDEF01,
            folder: 0x1111,
            file: 0x2222,
        };
        let name = recover_name(&FilenameDictionary::empty(), hashes, b"plain data").unwrap();

        assert_eq!(name.path, "1111/2222[FullHash=ABCDEF01]");
        assert!(!name.folder_resolved);
        assert!(!name.file_resolved);
    }

    #[test]
    fn test_hex_fallback_keeps_sniffed_extension() {
        let hashes = EntryHashes {
            full_path: 0xABCDEF01,
            folder: 0x1111,
            file: 0x2222,
        };
        let data = 0x20u32.to_le_bytes();
        let name = recover_name(&FilenameDictionary::empty(), hashes, &data).unwrap();

        assert_eq!(name.path, "1111/2222[FullHash=ABCDEF01].gfbmdl");
        assert_eq!(name.extension, ".gfbmdl");
    }

    #[test]
    fn test_embedded_container_name() {
        let hashes = EntryHashes {
            full_path: fnv::hash_str("textures/icon"),
            folder: fnv::hash_str("textures/"),
            file: fnv::hash_str("icon"),
        };
        let data = container(b"BNTX\0\0\0\0", "icon");
        let name = recover_name(&dict("textures/common.bntx"), hashes, &data).unwrap();

        assert_eq!(name.path, "textures/icon.bntx");
        assert!(name.folder_resolved && name.file_resolved);
    }

    #[test]
    fn test_shader_sibling_extension() {
        let data = container(b"BNSH\0\0\0\0", "field_common");

        for ext in [".bnsh_fsh", ".bnsh_vsh"] {
            let hashes = EntryHashes {
                full_path: 0,
                folder: fnv::hash_str("shaders/"),
                file: fnv::hash_str(&format!("field_common{ext}")),
            };
            let name = recover_name(&dict("shaders/x"), hashes, &data).unwrap();
            assert_eq!(name.path, format!("shaders/field_common{ext}"));
        }

        let hashes = EntryHashes {
            full_path: 0,
            folder: fnv::hash_str("shaders/"),
            file: 0x1234,
        };
        let name = recover_name(&dict("shaders/x"), hashes, &data).unwrap();
        assert_eq!(name.path, "shaders/field_common.bnsh");
    }

    #[test]
    fn test_dictionary_names_round_trip() {
        let dictionary = dict("bin/field/env/env_main.bin");
        let hashes = EntryHashes {
            full_path: 0x99,
            folder: fnv::hash_str("bin/field/env/"),
            file: fnv::hash_str("env_main.bin"),
        };
        let name = recover_name(&dictionary, hashes, b"data").unwrap();
        assert_eq!(name.path, "bin/field/env/env_main.bin");

        let rehashed = PathHashes::from_logical_path(&name.path);
        assert_eq!(rehashed.directory, hashes.folder);
        assert_eq!(rehashed.file, hashes.file);
    }

    #[test]
    fn test_folder_only_unresolved_keeps_marker() {
        let hashes = EntryHashes {
            full_path: 0xFEED,
            folder: 0x1111,
            file: fnv::hash_str("env_main.bin"),
        };
        let name = recover_name(&dict("env_main.bin"), hashes, b"data").unwrap();
        assert_eq!(name.path, "1111/env_main.bin[FullHash=FEED]");

        let rehashed = PathHashes::from_logical_path(&name.path);
        assert_eq!(rehashed.directory, 0x1111);
        assert_eq!(rehashed.file, hashes.file);
        assert_eq!(rehashed.full_path, 0xFEED);
    }

    #[test]
    fn test_full_path_tier() {
        let path = "bin/field/env/env_main.bin";
        let derived = PathHashes::from_logical_path(path);
        let hashes = EntryHashes {
            full_path: derived.full_path,
            folder: derived.directory,
            file: derived.file,
        };
        let name = recover_name(&dict(path), hashes, b"").unwrap();
        assert_eq!(name.path, path);
    }

    #[test]
    fn test_full_path_hit_with_other_file_hash_is_rejected() {
        let path = "bin/field/env/env_main.bin";
        let derived = PathHashes::from_logical_path(path);
        let hashes = EntryHashes {
            full_path: derived.full_path,
            folder: derived.directory,
            file: 0x2222,
        };
        let name = recover_name(&dict(path), hashes, b"").unwrap();

        assert_eq!(
            name.path,
            format!("bin/field/env/2222[FullHash={:X}]", derived.full_path)
        );
        assert!(name.folder_resolved);
        assert!(!name.file_resolved);
    }

    #[test]
    fn test_big_endian_container_unsupported() {
        let mut data = container(b"BNTX\0\0\0\0", "icon");
        data[0x0C] = 0xFE;
        data[0x0D] = 0xFF;
        let err = embedded_name(&data, ".bntx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

        let err = embedded_name(b"FRES\x03\x04\x00\x00", ".bfres").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_bad_name_offset_is_corrupt() {
        let mut data = container(b"BNTX\0\0\0\0", "icon");
        data[0x10..0x14].copy_from_slice(&0xFFFFu32.to_le_bytes());
        let err = embedded_name(&data, ".bntx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn test_short_container_has_no_name() {
        assert_eq!(embedded_name(b"BNTX\0\0\0\0", ".bntx").unwrap(), None);
    }
}
