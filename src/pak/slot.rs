//! Bit-packed PAK seek table slots
//!
//! Each slot is one little-endian `u32`: bits 0-28 hold the packet offset and
//! bits 29-31 the storage type.

use crate::codec::CompressionScheme;

/// How a packet's bytes are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// Stored as-is
    Raw,
    /// Stored as-is; the payload is a file in its own right
    FileWithinFile,
    /// Size prefix followed by an LZW stream
    Lzw,
    /// Huffman coded; not supported
    Huffman,
    /// Size prefix followed by a zlib stream
    Deflate,
    /// Tag values 5 and 6, never observed in shipped data
    Reserved(u8),
    /// Empty packet with no payload
    Null,
}

impl StorageType {
    /// Decode a 3-bit tag
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => StorageType::Raw,
            1 => StorageType::FileWithinFile,
            2 => StorageType::Lzw,
            3 => StorageType::Huffman,
            4 => StorageType::Deflate,
            7 => StorageType::Null,
            other => StorageType::Reserved(other),
        }
    }

    /// The 3-bit tag for this type
    pub fn bits(self) -> u8 {
        match self {
            StorageType::Raw => 0,
            StorageType::FileWithinFile => 1,
            StorageType::Lzw => 2,
            StorageType::Huffman => 3,
            StorageType::Deflate => 4,
            StorageType::Reserved(bits) => bits & 0x07,
            StorageType::Null => 7,
        }
    }

    /// Decompression scheme for size-prefixed packets
    pub fn scheme(self) -> Option<CompressionScheme> {
        match self {
            StorageType::Lzw => Some(CompressionScheme::Lzw),
            StorageType::Deflate => Some(CompressionScheme::Deflate),
            _ => None,
        }
    }

    /// True if the payload begins with a 4-byte uncompressed size
    pub fn has_size_prefix(self) -> bool {
        self.scheme().is_some()
    }

    /// Short lowercase label for listings
    pub fn label(self) -> &'static str {
        match self {
            StorageType::Raw => "raw",
            StorageType::FileWithinFile => "fwf",
            StorageType::Lzw => "lzw",
            StorageType::Huffman => "huffman",
            StorageType::Deflate => "zlib",
            StorageType::Reserved(_) => "reserved",
            StorageType::Null => "null",
        }
    }
}

/// One raw seek table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSlot(pub u32);

impl TableSlot {
    /// Position of the storage type bits
    pub const TYPE_SHIFT: u32 = 29;

    /// Mask selecting the offset bits
    pub const OFFSET_MASK: u32 = (1 << Self::TYPE_SHIFT) - 1;

    /// Pack an offset and a 3-bit type tag
    ///
    /// Offset bits above bit 28 are discarded.
    pub fn pack(offset: u32, type_bits: u8) -> Self {
        TableSlot((offset & Self::OFFSET_MASK) | (u32::from(type_bits & 0x07) << Self::TYPE_SHIFT))
    }

    /// Packet offset
    pub fn offset(self) -> u32 {
        self.0 & Self::OFFSET_MASK
    }

    /// Raw 3-bit type tag
    pub fn type_bits(self) -> u8 {
        (self.0 >> Self::TYPE_SHIFT) as u8
    }

    /// Decoded storage type
    pub fn storage_type(self) -> StorageType {
        StorageType::from_bits(self.type_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_bits() {
        for bits in 0..8u8 {
            assert_eq!(StorageType::from_bits(bits).bits(), bits);
        }
        assert_eq!(StorageType::from_bits(5), StorageType::Reserved(5));
        assert_eq!(StorageType::from_bits(7), StorageType::Null);
    }

    #[test]
    fn test_schemes() {
        assert_eq!(StorageType::Lzw.scheme(), Some(CompressionScheme::Lzw));
        assert_eq!(
            StorageType::Deflate.scheme(),
            Some(CompressionScheme::Deflate)
        );
        assert!(StorageType::Raw.scheme().is_none());
        assert!(!StorageType::Null.has_size_prefix());
    }

    #[test]
    fn test_slot_unpack() {
        let slot = TableSlot(0x4000_0010);
        assert_eq!(slot.offset(), 0x10);
        assert_eq!(slot.storage_type(), StorageType::Lzw);

        let null = TableSlot(0xE000_0400);
        assert_eq!(null.offset(), 0x400);
        assert_eq!(null.storage_type(), StorageType::Null);
    }

    #[test]
    fn test_slot_pack() {
        let slot = TableSlot::pack(0x1FFF_FFFF, 4);
        assert_eq!(slot.0, 0x9FFF_FFFF);
        assert_eq!(slot.offset(), 0x1FFF_FFFF);
        assert_eq!(slot.storage_type(), StorageType::Deflate);
    }
}
