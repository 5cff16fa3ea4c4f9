//! FST flat-table archives
//!
//! An FST file is a little-endian `u32` entry count followed by that many
//! 262-byte records and then the file data:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | data offset |
//! | 4 | 4 | compressed size |
//! | 8 | 4 | uncompressed size |
//! | 12 | 250 | path, backslash separated, NUL padded |
//!
//! An entry is LZW compressed when `0 < compressed < uncompressed`.

mod archive;
mod entry;

pub use archive::FstArchive;
pub use entry::{normalize_path, FstEntry};
