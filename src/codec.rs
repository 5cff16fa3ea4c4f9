//! Combined decompression dispatcher
//!
//! The archives occasionally mislabel which scheme compressed a payload, so
//! the dispatcher tries the labelled scheme first and retries with the other
//! one when the result is suspiciously short.

use crate::{deflate, lzw};
use log::{debug, warn};

/// Compression scheme announced by the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    /// Variable-width LZW (FST files and `Lzw` packets)
    Lzw,
    /// zlib-wrapped Deflate (`Deflate` packets)
    Deflate,
}

impl CompressionScheme {
    /// The scheme tried when this one falls short
    pub fn fallback(self) -> Self {
        match self {
            CompressionScheme::Lzw => CompressionScheme::Deflate,
            CompressionScheme::Deflate => CompressionScheme::Lzw,
        }
    }

    /// Run this scheme's decoder into `output`
    pub fn decode_into(self, input: &[u8], output: &mut [u8]) -> usize {
        match self {
            CompressionScheme::Lzw => lzw::decompress_into(input, output),
            CompressionScheme::Deflate => deflate::inflate_into(input, output),
        }
    }
}

/// Decompress `src` to at most `expected_size` bytes
///
/// If the labelled scheme yields less than half of `expected_size`, the other
/// scheme is tried and whichever produced more bytes wins. Returns an empty
/// buffer when `expected_size` is zero (no codec runs) or when both schemes
/// produce nothing.
pub fn decompress(src: &[u8], expected_size: usize, scheme: CompressionScheme) -> Vec<u8> {
    if src.is_empty() || expected_size == 0 {
        return Vec::new();
    }

    let mut output = vec![0u8; expected_size];
    let mut produced = scheme.decode_into(src, &mut output);

    if produced < expected_size / 2 {
        let other = scheme.fallback();
        let mut retry = vec![0u8; expected_size];
        let retried = other.decode_into(src, &mut retry);
        debug!("{scheme:?} produced {produced}/{expected_size} bytes, {other:?} produced {retried}");
        if retried > produced {
            warn!("Payload labelled {scheme:?} decoded as {other:?}");
            output = retry;
            produced = retried;
        }
    }

    if produced > 0 && produced < expected_size {
        warn!("Decompression short: {produced} of {expected_size} bytes");
    }

    output.truncate(produced);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_expected_size_is_empty() {
        assert!(decompress(&[1, 2, 3], 0, CompressionScheme::Lzw).is_empty());
        assert!(decompress(&[1, 2, 3], 0, CompressionScheme::Deflate).is_empty());
    }

    #[test]
    fn test_empty_source() {
        assert!(decompress(&[], 10, CompressionScheme::Lzw).is_empty());
    }

    #[test]
    fn test_lzw_path() {
        // Clear, 'A', 'B', 'A', EndOfData
        let stream = [0x00, 0x83, 0x08, 0x09, 0x12, 0x10];
        assert_eq!(decompress(&stream, 3, CompressionScheme::Lzw), b"ABA");
    }

    #[test]
    fn test_fallback_pairs() {
        assert_eq!(
            CompressionScheme::Lzw.fallback(),
            CompressionScheme::Deflate
        );
        assert_eq!(
            CompressionScheme::Deflate.fallback(),
            CompressionScheme::Lzw
        );
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn test_mislabelled_deflate_recovered() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let data = b"TERRAIN ".repeat(250);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();

        // Labelled LZW, actually zlib
        let result = decompress(&compressed, data.len(), CompressionScheme::Lzw);
        assert_eq!(result, data);
    }
}
