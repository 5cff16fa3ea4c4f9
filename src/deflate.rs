//! zlib/Deflate bridge for `Deflate` PAK packets
//!
//! A thin adapter over `flate2` with a pre-known output size. Built without
//! the `zlib` feature it is a stub that always reports zero bytes, and the
//! dispatcher in [`crate::codec`] falls back to LZW.

/// True when the crate was built with Deflate support
pub fn is_available() -> bool {
    cfg!(feature = "zlib")
}

/// Inflate a zlib stream into `output`, returning the number of bytes written
///
/// Returns 0 on any decoder error. Output that does not fit is dropped.
#[cfg(feature = "zlib")]
pub fn inflate_into(input: &[u8], output: &mut [u8]) -> usize {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    if input.is_empty() || output.is_empty() {
        return 0;
    }

    let mut decoder = ZlibDecoder::new(input);
    let mut written = 0;
    while written < output.len() {
        match decoder.read(&mut output[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) => {
                log::debug!("inflate failed after {written} bytes: {e}");
                return 0;
            }
        }
    }
    written
}

/// Inflate a zlib stream into `output`, returning the number of bytes written
///
/// Built without the `zlib` feature: always 0.
#[cfg(not(feature = "zlib"))]
pub fn inflate_into(_input: &[u8], _output: &mut [u8]) -> usize {
    0
}

/// Inflate into a new buffer of at most `capacity` bytes
pub fn inflate(input: &[u8], capacity: usize) -> Vec<u8> {
    let mut output = vec![0u8; capacity];
    let written = inflate_into(input, &mut output);
    output.truncate(written);
    output
}
