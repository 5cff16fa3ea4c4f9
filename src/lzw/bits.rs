//! LSB-first bit reader for LZW code streams
//!
//! Codes are packed little-endian across byte boundaries: the first code
//! occupies the low bits of the first byte and spills into the next one.

/// Reads variable-width codes from a byte slice
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    input: &'a [u8],
    /// Position of the next unread byte
    in_pos: usize,
    /// Carry buffer holding bits not yet consumed
    bit_buff: u32,
    /// Number of valid bits in `bit_buff`
    extra_bits: u32,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `input`
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            in_pos: 0,
            bit_buff: 0,
            extra_bits: 0,
        }
    }

    /// Read the next `width` bits (1..=16) as a code
    ///
    /// Returns `None` when fewer than `width` bits remain.
    pub fn read_code(&mut self, width: u32) -> Option<u16> {
        debug_assert!((1..=16).contains(&width));

        while self.extra_bits < width {
            let byte = *self.input.get(self.in_pos)?;
            self.bit_buff |= u32::from(byte) << self.extra_bits;
            self.in_pos += 1;
            self.extra_bits += 8;
        }

        let code = self.bit_buff & ((1 << width) - 1);
        self.bit_buff >>= width;
        self.extra_bits -= width;
        Some(code as u16)
    }

    /// Bytes pulled from the input so far
    pub fn bytes_consumed(&self) -> usize {
        self.in_pos
    }

    /// Bits still available, buffered or unread
    pub fn bits_remaining(&self) -> usize {
        (self.input.len() - self.in_pos) * 8 + self.extra_bits as usize
    }
}
