//! FST table records

use crate::common::{FST_ENTRY_SIZE, FST_PATH_SIZE};
use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::WINDOWS_1252;

/// One file in an FST archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FstEntry {
    /// Absolute offset of the stored bytes
    pub data_offset: u32,
    /// Stored size when compressed
    pub compressed_size: u32,
    /// Original file size
    pub uncompressed_size: u32,
    /// Archive path with forward slashes
    pub path: String,
}

impl FstEntry {
    /// Parse a 262-byte table record
    ///
    /// The path field is NUL-padded; anything after the first NUL is ignored
    /// and trailing whitespace is trimmed before separators are normalized.
    /// Paths are Windows-1252 text, so every byte maps to one character.
    pub fn parse(record: &[u8; FST_ENTRY_SIZE]) -> Self {
        let data_offset = LittleEndian::read_u32(&record[0..4]);
        let compressed_size = LittleEndian::read_u32(&record[4..8]);
        let uncompressed_size = LittleEndian::read_u32(&record[8..12]);

        let raw_path = &record[12..12 + FST_PATH_SIZE];
        let end = raw_path.iter().position(|&b| b == 0).unwrap_or(FST_PATH_SIZE);
        let (path, _) = WINDOWS_1252.decode_without_bom_handling(&raw_path[..end]);
        let path = normalize_path(path.trim_end_matches(['\0', ' ', '\r', '\n']));

        Self {
            data_offset,
            compressed_size,
            uncompressed_size,
            path,
        }
    }

    /// True when the stored bytes are LZW compressed
    pub fn is_compressed(&self) -> bool {
        self.compressed_size > 0 && self.compressed_size < self.uncompressed_size
    }

    /// Number of bytes occupied in the archive
    pub fn stored_size(&self) -> u32 {
        if self.is_compressed() {
            self.compressed_size
        } else {
            self.uncompressed_size
        }
    }

    /// Case-insensitive, separator-insensitive exact path match
    pub fn matches(&self, path: &str) -> bool {
        self.path.len() == path.len()
            && self
                .path
                .bytes()
                .zip(path.bytes())
                .all(|(a, b)| fold(a) == fold(b))
    }
}

/// Convert backslash separators to forward slashes
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn fold(byte: u8) -> u8 {
    if byte == b'\\' {
        b'/'
    } else {
        byte.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(offset: u32, packed: u32, unpacked: u32, path: &[u8]) -> [u8; FST_ENTRY_SIZE] {
        let mut rec = [0u8; FST_ENTRY_SIZE];
        rec[0..4].copy_from_slice(&offset.to_le_bytes());
        rec[4..8].copy_from_slice(&packed.to_le_bytes());
        rec[8..12].copy_from_slice(&unpacked.to_le_bytes());
        rec[12..12 + path.len()].copy_from_slice(path);
        rec
    }

    #[test]
    fn test_parse_record() {
        let entry = FstEntry::parse(&record(0x1000, 40, 100, b"Data\\Art\\Logo.tga"));
        assert_eq!(entry.data_offset, 0x1000);
        assert_eq!(entry.compressed_size, 40);
        assert_eq!(entry.uncompressed_size, 100);
        assert_eq!(entry.path, "Data/Art/Logo.tga");
        assert!(entry.is_compressed());
        assert_eq!(entry.stored_size(), 40);
    }

    #[test]
    fn test_trailing_junk_trimmed() {
        let entry = FstEntry::parse(&record(0, 0, 5, b"misc\\pal.pal \r\n"));
        assert_eq!(entry.path, "misc/pal.pal");
        assert!(!entry.is_compressed());
        assert_eq!(entry.stored_size(), 5);
    }

    #[test]
    fn test_compression_flag() {
        let same = FstEntry::parse(&record(0, 10, 10, b"a"));
        assert!(!same.is_compressed());
        let zero = FstEntry::parse(&record(0, 0, 10, b"a"));
        assert!(!zero.is_compressed());
        let bigger = FstEntry::parse(&record(0, 12, 10, b"a"));
        assert!(!bigger.is_compressed());
        assert_eq!(bigger.stored_size(), 10);
    }

    #[test]
    fn test_code_page_path() {
        let entry = FstEntry::parse(&record(0, 0, 1, b"maps\\caf\xe9_\x81.dat"));
        assert_eq!(entry.path, "maps/caf\u{e9}_\u{81}.dat");
        assert!(!entry.path.contains('\u{fffd}'));
        assert!(entry.matches("MAPS\\CAF\u{e9}_\u{81}.DAT"));
        assert!(!entry.matches("maps/caf\u{c9}_\u{81}.dat"));
    }

    #[test]
    fn test_matches() {
        let entry = FstEntry::parse(&record(0, 0, 1, b"data/foo.bin"));
        assert!(entry.matches("Data\\Foo.Bin"));
        assert!(entry.matches("DATA/FOO.BIN"));
        assert!(!entry.matches("data/foo.bin2"));
        assert!(!entry.matches("data/foo.bi"));
    }
}
