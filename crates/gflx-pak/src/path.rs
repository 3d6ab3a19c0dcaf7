//! Logical path hashing.
//!
//! A GFPAK stores three hashes per file: the directory (`FNV(dir + "/")`),
//! the file name (`FNV(name)`) and the full path (`FNV(dir/name)`). Names
//! that could not be recovered come back as hex literals, optionally with
//! a `[FullHash=<hex>]` marker; hashing such a name reuses the literal
//! values so the original identifiers survive a round trip.

use gflx_common::fnv::{self, Fnv64a};

/// Opening of the full-hash marker embedded in unresolved names.
pub const FULL_HASH_MARKER: &str = "[FullHash=";

/// The three hashes that identify a file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHashes {
    /// Directory hash, `FNV(dir + "/")` unless given as a hex literal.
    pub directory: u64,
    /// File name hash, `FNV(name)` unless given as a hex literal.
    pub file: u64,
    /// Full path hash, from the marker or `FNV(dir/name)`.
    pub full_path: u64,
    /// Path with `/` separators and any marker removed.
    pub logical: String,
}

impl PathHashes {
    /// Compute the hashes for a logical path such as `bin/field/env_main.bin`.
    ///
    /// Backslashes are treated as separators. A directory or file name
    /// that is a bare hexadecimal literal is taken as the hash itself.
    ///
    /// This applies to real names too: a file named `cafe` hashes to
    /// `0xCAFE`, not `FNV("cafe")`, so a dictionary-recovered name made
    /// only of hex digits does not reproduce its stored file hash when
    /// added again.
    pub fn from_logical_path(path: &str) -> Self {
        let normalized = path.replace('\\', "/");
        let (directory, file_component) = match normalized.rfind('/') {
            Some(pos) => (Some(&normalized[..pos]), &normalized[pos + 1..]),
            None => (None, normalized.as_str()),
        };

        let (file_name, literal_candidate, full_override) = split_marker(file_component);

        let file = parse_hex(literal_candidate).unwrap_or_else(|| fnv::hash_str(&file_name));

        let dir_str = directory.unwrap_or("");
        let directory_hash = parse_hex(dir_str)
            .unwrap_or_else(|| Fnv64a::new().update(dir_str.as_bytes()).update(b"/").finish());

        let logical = match directory {
            Some(dir) => format!("{dir}/{file_name}"),
            None => file_name,
        };

        let full_path = full_override.unwrap_or_else(|| fnv::hash_str(&logical));

        Self {
            directory: directory_hash,
            file,
            full_path,
            logical,
        }
    }
}

/// Split `stem[FullHash=HEX]rest` into (`stem` + `rest`, `stem`, HEX).
///
/// Without a well-formed marker the whole component is both the name and
/// the hex-literal candidate.
fn split_marker(component: &str) -> (String, &str, Option<u64>) {
    if let Some(start) = component.find(FULL_HASH_MARKER) {
        let hex_start = start + FULL_HASH_MARKER.len();
        if let Some(len) = component[hex_start..].find(']') {
            let before = &component[..start];
            let after = &component[hex_start + len + 1..];
            let full = parse_hex(&component[hex_start..hex_start + len]);
            return (format!("{before}{after}"), before, full);
        }
    }
    (component.to_string(), component, None)
}

/// Parse a bare hexadecimal literal of 1 to 16 digits.
pub fn parse_hex(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

/// Extension (with leading dot) of the last path component, ignoring any marker.
///
/// Returns an empty string when the name has none.
pub fn extension_of(name: &str) -> &str {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let file = match file.find(FULL_HASH_MARKER) {
        Some(start) => match file[start..].find(']') {
            Some(len) if start + len + 1 < file.len() => &file[start + len + 1..],
            _ => &file[..start],
        },
        None => file,
    };
    file.rfind('.').map_or("", |dot| &file[dot..])
}
