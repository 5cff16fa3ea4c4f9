//! Common types and constants for the MechCommander Gold archive formats
//!
//! This module defines the error type, the shared options struct and the
//! layout constants used by the FST and PAK readers, the LZW decoder and the
//! shape strip decoder.

use crate::pak::StorageType;
use thiserror::Error;

/// Error type for archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error while opening, seeking or reading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header failed a magic or count sanity check
    #[error("Corrupt header: {0}")]
    CorruptHeader(String),

    /// Declared structure extends past the bytes actually available
    #[error("Truncated archive: needed {needed} bytes, only {available} available")]
    TruncatedArchive {
        /// Number of bytes the header claims
        needed: u64,
        /// Number of bytes present
        available: u64,
    },

    /// Both decompression schemes produced nothing
    #[error("Decompression failed: no output for {expected} expected bytes")]
    DecompressionFailed {
        /// Uncompressed size announced by the container
        expected: usize,
    },

    /// Packet uses a storage scheme this crate cannot decode
    #[error("Unsupported storage type: {0:?}")]
    UnsupportedStorageType(StorageType),

    /// Shape frame bounds are empty or too large
    #[error("Invalid shape dimensions: {width}x{height}")]
    InvalidShapeDimensions {
        /// Width derived from the frame bounds
        width: i32,
        /// Height derived from the frame bounds
        height: i32,
    },

    /// No FST entry matches the requested path
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Packet or frame index past the end of the table
    #[error("Index {index} out of range (count {count})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of items available
        count: usize,
    },

    /// Declared uncompressed size exceeds the configured ceiling
    #[error("Declared size {declared} exceeds limit {limit}")]
    SizeLimitExceeded {
        /// Size announced by the archive
        declared: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Nested container recursion went past the configured depth
    #[error("Nested containers deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Packet payload is not itself a PAK container
    #[error("Packet {0} is not a nested PAK container")]
    NotNested(usize),
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

// Layout constants

/// PAK header magic (little-endian `CE FA ED FE` on disk)
pub const PAK_MAGIC: u32 = 0xFEED_FACE;

/// Size of the PAK header: magic + first table slot
pub const PAK_HEADER_SIZE: u32 = 8;

/// Size of one FST table record
pub const FST_ENTRY_SIZE: usize = 262;

/// Size of the path field inside an FST record
pub const FST_PATH_SIZE: usize = 250;

/// Size of the fixed header in front of every shape frame
pub const SHAPE_FRAME_HEADER_SIZE: usize = 24;

/// Default FST entry count ceiling
pub const DEFAULT_MAX_FST_ENTRIES: u32 = 100_000;

/// Default PAK entry count ceiling
pub const DEFAULT_MAX_PAK_ENTRIES: u32 = 1_000_000;

/// Default ceiling for a single decompressed asset (64MB)
pub const DEFAULT_MAX_UNPACKED_SIZE: u32 = 64 * 1024 * 1024;

/// Default nesting depth for recursive PAK traversal
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 8;

/// Default shape frame count ceiling
pub const DEFAULT_MAX_SHAPE_FRAMES: u32 = 10_000;

/// Default maximum shape width or height in pixels
pub const DEFAULT_MAX_SHAPE_DIMENSION: i32 = 1024;

/// Sanity limits and strictness switches applied while parsing
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Maximum entry count accepted in an FST header
    pub max_fst_entries: u32,
    /// Maximum entry count derived from a PAK header
    pub max_pak_entries: u32,
    /// Maximum uncompressed size accepted for one asset
    pub max_unpacked_size: u32,
    /// Maximum recursion depth through nested PAK containers
    pub max_nesting_depth: usize,
    /// Reject PAK containers whose magic does not match
    pub strict_magic: bool,
    /// Maximum frame count in a shape strip
    pub max_shape_frames: u32,
    /// Maximum frame width or height
    pub max_shape_dimension: i32,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            max_fst_entries: DEFAULT_MAX_FST_ENTRIES,
            max_pak_entries: DEFAULT_MAX_PAK_ENTRIES,
            max_unpacked_size: DEFAULT_MAX_UNPACKED_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            strict_magic: false,
            max_shape_frames: DEFAULT_MAX_SHAPE_FRAMES,
            max_shape_dimension: DEFAULT_MAX_SHAPE_DIMENSION,
        }
    }
}

impl ArchiveOptions {
    /// Defaults, except that a PAK magic mismatch fails the open
    pub fn strict() -> Self {
        Self {
            strict_magic: true,
            ..Self::default()
        }
    }

    /// Set the FST entry count ceiling
    pub fn with_max_fst_entries(mut self, limit: u32) -> Self {
        self.max_fst_entries = limit;
        self
    }

    /// Set the PAK entry count ceiling
    pub fn with_max_pak_entries(mut self, limit: u32) -> Self {
        self.max_pak_entries = limit;
        self
    }

    /// Set the per-asset uncompressed size ceiling
    pub fn with_max_unpacked_size(mut self, limit: u32) -> Self {
        self.max_unpacked_size = limit;
        self
    }

    /// Set the nested container depth limit
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Toggle strict PAK magic checking
    pub fn with_strict_magic(mut self, strict: bool) -> Self {
        self.strict_magic = strict;
        self
    }
}
