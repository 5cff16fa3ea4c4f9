//! Variable-width LZW decompression
//!
//! MechCommander Gold compresses FST files and `Lzw` PAK packets with a
//! hash-chained LZW variant. Codes start 9 bits wide and grow to at most 12;
//! two codes are reserved (`256` clears the dictionary, `257` ends the stream)
//! and every code from `258` up names a dictionary entry stored as a
//! `(previous code, suffix byte)` pair.
//!
//! The decoder never fails hard. Malformed or truncated input stops the decode
//! loop and the bytes produced so far are returned; callers compare that length
//! with the size they expected and decide whether to fall back to Deflate.
//!
//! # Example
//!
//! ```
//! // Clear, 'A', 'B', 'A', EndOfData packed as 9-bit codes
//! let stream = [0x00, 0x83, 0x08, 0x09, 0x12, 0x10];
//! assert_eq!(mcgarc::lzw::decompress(&stream, 16), b"ABA");
//! ```

mod bits;
mod decoder;
mod state;

pub use bits::BitReader;
pub use decoder::LzwDecoder;
pub use state::{Dictionary, ScratchStack};

/// Resets the dictionary; the next code is a literal byte
pub const CLEAR_CODE: u16 = 256;

/// Terminates the stream
pub const END_OF_DATA: u16 = 257;

/// First code assigned to a dictionary entry
pub const FIRST_FREE_CODE: u16 = 258;

/// Code width after a reset
pub const MIN_CODE_WIDTH: u32 = 9;

/// Code width ceiling
pub const MAX_CODE_WIDTH: u32 = 12;

/// Number of codes addressable at the maximum width
pub const MAX_CODE_COUNT: u16 = 1 << MAX_CODE_WIDTH;

/// Number of dictionary slots (codes 258..4096)
pub const DICTIONARY_CAPACITY: usize = (MAX_CODE_COUNT - FIRST_FREE_CODE) as usize;

/// Scratch stack size used while resolving a chain
pub const STACK_CAPACITY: usize = 4096;

/// Decompress `input` into `output`, returning the number of bytes written
///
/// Never writes past `output.len()`; output beyond the buffer is dropped.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> usize {
    LzwDecoder::new().decode(input, output)
}

/// Decompress `input` into a new buffer of at most `capacity` bytes
///
/// The returned vector is shortened to the bytes actually produced.
pub fn decompress(input: &[u8], capacity: usize) -> Vec<u8> {
    let mut output = vec![0u8; capacity];
    let written = decompress_into(input, &mut output);
    output.truncate(written);
    output
}
