//! mcgarc - readers for the MechCommander Gold archive formats
//!
//! This crate reads the game's two archive containers and decodes the assets
//! stored inside them:
//!
//! - **FST** flat-table archives: a count, a table of 262-byte records and the
//!   file data, optionally LZW compressed per file
//! - **PAK** packet containers: a bit-packed seek table whose packets may be
//!   raw, LZW, zlib or another PAK container
//! - **Shape strips**: tables of run-length encoded sprite frames found inside
//!   decoded PAK packets
//!
//! The LZW decoder is the game's own variable-width (9 to 12 bit) variant.
//! Deflate support comes from `flate2` behind the `zlib` feature.
//!
//! # Example - FST archive
//!
//! ```no_run
//! use mcgarc::{open_fst_archive, read_asset};
//!
//! let mut archive = open_fst_archive("MISSION.FST")?;
//! for entry in archive.entries() {
//!     println!("{} ({} bytes)", entry.path, entry.uncompressed_size);
//! }
//! let data = read_asset(&mut archive, "data\\missions\\mc2_01.abl")?;
//! # Ok::<(), mcgarc::ArchiveError>(())
//! ```
//!
//! # Example - PAK container and sprites
//!
//! ```no_run
//! use mcgarc::{decode_sprite_frame, open_pak_container, ShapeStrip};
//!
//! let mut pak = open_pak_container("SPRITES.PAK")?;
//! let strip = ShapeStrip::load(pak.read_packet(0)?)?;
//! let frame = decode_sprite_frame(&strip, 0)?;
//! println!("{}x{} hotspot ({}, {})", frame.width, frame.height, frame.hotspot_x, frame.hotspot_y);
//! # Ok::<(), mcgarc::ArchiveError>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod codec;
pub mod common;
pub mod deflate;
pub mod error;
pub mod extract;
pub mod fst;
pub mod lzw;
pub mod pak;
pub mod shape;

// Re-export commonly used types
pub use codec::CompressionScheme;
pub use common::{ArchiveError, ArchiveOptions, Result, PAK_MAGIC};
pub use extract::{ExtractProgress, ExtractSummary};
pub use fst::{FstArchive, FstEntry};
pub use pak::{is_pak_magic, NestedPacket, PakContainer, PakEntry, StorageType};
pub use shape::{ShapeFrame, ShapePack, ShapeStrip};

use std::io::{Read, Seek};
use std::path::Path;

// Convenience functions

/// Open an FST archive with default options
pub fn open_fst_archive<P: AsRef<Path>>(path: P) -> Result<FstArchive> {
    FstArchive::open(path)
}

/// Open a PAK container with default options
pub fn open_pak_container<P: AsRef<Path>>(path: P) -> Result<PakContainer> {
    PakContainer::open(path)
}

/// Read one file from an FST archive by its logical path
///
/// The lookup ignores case and accepts either separator style.
pub fn read_asset<R: Read + Seek>(archive: &mut FstArchive<R>, logical_path: &str) -> Result<Vec<u8>> {
    archive.read_file_by_path(logical_path)
}

/// Decode frame `index` of a shape strip
pub fn decode_sprite_frame(strip: &ShapeStrip, index: usize) -> Result<ShapeFrame> {
    strip.decode_frame(index)
}
