//! Content sniffing by leading magic bytes.

/// How a signature is matched against the start of a payload.
#[derive(Debug, Clone, Copy)]
enum Magic {
    /// ASCII tag at offset 0.
    Tag(&'static [u8]),
    /// Little-endian u32 at offset 0.
    Marker(u32),
}

/// Ordered signature table; the first match wins.
///
/// More specific tags sit before shorter ones they share a prefix with
/// (`FSTM` before `STM`).
const SIGNATURES: &[(Magic, &str)] = &[
    (Magic::Tag(b"SARC"), ".szs"),
    (Magic::Tag(b"Yaz"), ".szs"),
    (Magic::Tag(b"YB"), ".byaml"),
    (Magic::Tag(b"BY"), ".byaml"),
    (Magic::Tag(b"FRES"), ".bfres"),
    (Magic::Tag(b"Gfx2"), ".gtx"),
    (Magic::Tag(b"FLYT"), ".bflyt"),
    (Magic::Tag(b"CLAN"), ".bclan"),
    (Magic::Tag(b"CLYT"), ".bclyt"),
    (Magic::Tag(b"FLIM"), ".bclim"),
    (Magic::Tag(b"FLAN"), ".bflan"),
    (Magic::Tag(b"FSEQ"), ".bfseq"),
    (Magic::Tag(b"VFXB"), ".ptcl"),
    (Magic::Tag(b"AAHS"), ".sharc"),
    (Magic::Tag(b"BAHS"), ".sharcb"),
    (Magic::Tag(b"BNTX"), ".bntx"),
    (Magic::Tag(b"BNSH"), ".bnsh"),
    (Magic::Tag(b"FSHA"), ".bfsha"),
    (Magic::Tag(b"FFNT"), ".bffnt"),
    (Magic::Tag(b"CFNT"), ".bcfnt"),
    (Magic::Tag(b"CSTM"), ".bcstm"),
    (Magic::Tag(b"FSTM"), ".bfstm"),
    (Magic::Tag(b"STM"), ".bstm"),
    (Magic::Tag(b"CWAV"), ".bcwav"),
    (Magic::Tag(b"FWAV"), ".bfwav"),
    (Magic::Tag(b"CTPK"), ".ctpk"),
    (Magic::Tag(b"CGFX"), ".bcres"),
    (Magic::Tag(b"AAMP"), ".aamp"),
    (Magic::Tag(b"MsgStdBn"), ".msbt"),
    (Magic::Tag(b"MsgPrjBn"), ".msbp"),
    (Magic::Marker(0x0000_0004), ".gfbanm"),
    (Magic::Marker(0x0000_0014), ".gfbanm"),
    (Magic::Marker(0x0000_0018), ".gfbanmcfg"),
    (Magic::Marker(0x0000_0020), ".gfbmdl"),
    (Magic::Marker(0x0000_0044), ".gfbpokecfg"),
];

impl Magic {
    fn matches(self, data: &[u8]) -> bool {
        match self {
            Magic::Tag(tag) => data.starts_with(tag),
            Magic::Marker(value) => data
                .get(..4)
                .is_some_and(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) == value),
        }
    }
}

/// Guess a file extension (with leading dot) from the payload's first bytes.
///
/// Returns an empty string when nothing matches.
pub fn sniff_extension(data: &[u8]) -> &'static str {
    SIGNATURES
        .iter()
        .find(|(magic, _)| magic.matches(data))
        .map_or("", |(_, ext)| ext)
}

/// Extensions of containers that carry their own name in a binary header.
pub fn has_embedded_name(extension: &str) -> bool {
    matches!(extension, ".bntx" | ".bfres" | ".bnsh" | ".bfsha")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_tags() {
        assert_eq!(sniff_extension(b"BNTX\0\0\0\0"), ".bntx");
        assert_eq!(sniff_extension(b"SARC"), ".szs");
        assert_eq!(sniff_extension(b"Yaz0...."), ".szs");
        assert_eq!(sniff_extension(b"MsgStdBn"), ".msbt");
    }

    #[test]
    fn test_specific_before_generic() {
        assert_eq!(sniff_extension(b"FSTM"), ".bfstm");
        assert_eq!(sniff_extension(b"STM\0"), ".bstm");
    }

    #[test]
    fn test_markers() {
        assert_eq!(sniff_extension(&0x20u32.to_le_bytes()), ".gfbmdl");
        assert_eq!(sniff_extension(&[0x44, 0, 0, 0, 0xFF]), ".gfbpokecfg");
        assert_eq!(sniff_extension(&[0x20, 0, 0]), "");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(sniff_extension(b""), "");
        assert_eq!(sniff_extension(b"hello world"), "");
    }

    #[test]
    fn test_embedded_name_families() {
        assert!(has_embedded_name(".bntx"));
        assert!(has_embedded_name(".bnsh"));
        assert!(!has_embedded_name(".gfbmdl"));
    }
}
