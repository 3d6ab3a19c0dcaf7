//! Per-entry compression codecs.
//!
//! Every file entry carries its own codec tag, so one archive may mix
//! stored, zlib and LZ4 payloads freely.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::trace;

use crate::{Error, Result};

/// Compression level written for new entries.
pub const DEFAULT_LEVEL: u16 = 9;

/// Compression codecs used in GFPAK archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u16)]
pub enum Codec {
    /// Stored as-is.
    None = 0,
    /// zlib-wrapped DEFLATE.
    Zlib = 1,
    /// Raw LZ4 block, no size prefix.
    #[default]
    Lz4 = 2,
}

impl TryFrom<u16> for Codec {
    type Error = u16;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            2 => Ok(Self::Lz4),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Codec::None => "none",
            Codec::Zlib => "zlib",
            Codec::Lz4 => "lz4",
        })
    }
}

impl std::str::FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "store" => Ok(Codec::None),
            "zlib" => Ok(Codec::Zlib),
            "lz4" => Ok(Codec::Lz4),
            other => Err(format!("unknown codec: {other}")),
        }
    }
}

/// Compress `data` with `codec`.
///
/// `level` is an effort hint; only zlib interprets it (clamped to 0-9).
pub fn compress(data: &[u8], codec: Codec, level: u16) -> Result<Vec<u8>> {
    let compressed = match codec {
        Codec::None => data.to_vec(),
        Codec::Zlib => {
            let mut encoder =
                ZlibEncoder::new(Vec::new(), Compression::new(u32::from(level.min(9))));
            encoder
                .write_all(data)
                .map_err(|e| Error::Compression(e.to_string()))?;
            encoder
                .finish()
                .map_err(|e| Error::Compression(e.to_string()))?
        }
        Codec::Lz4 => lz4_flex::block::compress(data),
    };

    trace!(%codec, input = data.len(), output = compressed.len(), "compressed payload");
    Ok(compressed)
}

/// Decompress `data` with `codec`, requiring exactly `expected_size` output bytes.
pub fn decompress(data: &[u8], codec: Codec, expected_size: usize) -> Result<Vec<u8>> {
    let output = match codec {
        Codec::None => data.to_vec(),
        _ if expected_size == 0 => Vec::new(),
        Codec::Zlib => decompress_zlib(data, expected_size)?,
        Codec::Lz4 => lz4_flex::block::decompress(data, expected_size)
            .map_err(|e| Error::Decompression(format!("LZ4: {e}")))?,
    };

    if output.len() != expected_size {
        return Err(Error::SizeMismatch {
            expected: expected_size,
            actual: output.len(),
        });
    }

    Ok(output)
}

fn decompress_zlib(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size);

    // One extra byte is enough to detect oversized streams.
    ZlibDecoder::new(data)
        .take(expected_size as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(format!("zlib: {e}")))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const ALL: [Codec; 3] = [Codec::None, Codec::Zlib, Codec::Lz4];

    fn roundtrip(data: &[u8]) {
        for codec in ALL {
            let packed = compress(data, codec, DEFAULT_LEVEL).unwrap();
            let unpacked = decompress(&packed, codec, data.len()).unwrap();
            assert_eq!(unpacked, data, "codec {codec}");
        }
    }

    #[test]
    fn test_roundtrip_empty() {
        roundtrip(&[]);
    }

    #[test]
    fn test_roundtrip_single_byte() {
        roundtrip(&[0x5A]);
    }

    #[test]
    fn test_roundtrip_large() {
        let data: Vec<u8> = (0..(1usize << 20) + 4096)
            .map(|i| (i.wrapping_mul(31) ^ (i >> 7)) as u8)
            .collect();
        roundtrip(&data);
    }

    #[test]
    fn test_codec_tags() {
        assert_eq!(Codec::try_from(0), Ok(Codec::None));
        assert_eq!(Codec::try_from(1), Ok(Codec::Zlib));
        assert_eq!(Codec::try_from(2), Ok(Codec::Lz4));
        assert_eq!(Codec::try_from(3), Err(3));
        assert_eq!("LZ4".parse::<Codec>(), Ok(Codec::Lz4));
    }

    #[test]
    fn test_size_mismatch_is_corrupt() {
        let packed = compress(b"twelve bytes", Codec::Lz4, DEFAULT_LEVEL).unwrap();
        let err = decompress(&packed, Codec::Lz4, 64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);

        let err = decompress(b"abc", Codec::None, 4).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 4, actual: 3 }));

        let packed = compress(&[7u8; 100], Codec::Zlib, DEFAULT_LEVEL).unwrap();
        let err = decompress(&packed, Codec::Zlib, 50).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 50, actual: 51 }));
    }

    #[test]
    fn test_garbage_zlib_is_corrupt() {
        let err = decompress(&[0xFF, 0x00, 0x13, 0x37], Codec::Zlib, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }
}
