//! PAK packet containers
//!
//! A PAK file starts with an 8-byte header followed by a seek table of
//! little-endian `u32` slots, then the packet data:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `0xFEEDFACE` |
//! | 4 | 4 | offset of the first packet (low 29 bits) |
//! | 8 | 4 * n | one slot per packet |
//!
//! The first packet starts right after the table, so the packet count is
//! `first_offset / 4 - 2`. Each slot stores an offset in bits 0-28 and a
//! [`StorageType`] in bits 29-31. Packets stored as `Lzw` or `Deflate` begin
//! with a 4-byte uncompressed size.
//!
//! Any packet may itself be a complete PAK container; see
//! [`PakContainer::nested`] and [`PakContainer::walk`].

mod container;
mod slot;
mod walk;

pub use container::{PakContainer, PakEntry};
pub use slot::{StorageType, TableSlot};
pub use walk::NestedPacket;

use crate::common::PAK_MAGIC;

/// True if `data` is long enough for a PAK header and starts with the magic
pub fn is_pak_magic(data: &[u8]) -> bool {
    data.len() >= 8 && data[..4] == PAK_MAGIC.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pak_magic() {
        assert!(is_pak_magic(&[0xCE, 0xFA, 0xED, 0xFE, 0x0C, 0, 0, 0]));
        assert!(!is_pak_magic(&[0xCE, 0xFA, 0xED, 0xFE]));
        assert!(!is_pak_magic(&[0xFE, 0xED, 0xFA, 0xCE, 0x0C, 0, 0, 0]));
        assert!(!is_pak_magic(&[]));
    }
}
