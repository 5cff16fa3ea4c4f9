//! LZW decode loop
//!
//! This module implements the code-by-code expansion: reading codes at the
//! current width, handling the Clear / EndOfData control codes, resolving
//! dictionary chains and growing the code width as the dictionary fills.

use super::state::{Dictionary, ScratchStack};
use super::{BitReader, CLEAR_CODE, END_OF_DATA, MAX_CODE_WIDTH, MIN_CODE_WIDTH};
use log::trace;

/// Stateful LZW decoder
#[derive(Debug, Clone)]
pub struct LzwDecoder {
    dictionary: Dictionary,
    stack: ScratchStack,
    /// Current code width in bits
    code_width: u32,
    /// Free index at which the width grows
    max_index: u16,
    /// Previous code, `None` right after a reset
    old_code: Option<u16>,
    /// First byte of the previous code's string
    old_first: u8,
}

/// Writes into a caller buffer, dropping bytes once it is full
struct OutputCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl OutputCursor<'_> {
    fn put(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.pos) {
            *slot = byte;
            self.pos += 1;
        }
    }

    fn is_full(&self) -> bool {
        self.pos >= self.buf.len()
    }
}

impl LzwDecoder {
    /// Create a decoder in its post-Clear state
    pub fn new() -> Self {
        Self {
            dictionary: Dictionary::new(),
            stack: ScratchStack::new(),
            code_width: MIN_CODE_WIDTH,
            max_index: 1 << MIN_CODE_WIDTH,
            old_code: None,
            old_first: 0,
        }
    }

    /// Return to the state that follows a Clear code
    pub fn reset(&mut self) {
        self.dictionary.reset();
        self.stack.clear();
        self.code_width = MIN_CODE_WIDTH;
        self.max_index = 1 << MIN_CODE_WIDTH;
        self.old_code = None;
        self.old_first = 0;
    }

    /// Current code width in bits
    pub fn code_width(&self) -> u32 {
        self.code_width
    }

    /// Decode `input` into `output`, returning the number of bytes written
    ///
    /// Decoding stops at EndOfData, when the input runs out, when `output`
    /// is full, or when corrupt input is detected; in every case the bytes
    /// already produced are kept.
    pub fn decode(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        self.reset();
        let mut reader = BitReader::new(input);
        let mut out = OutputCursor { buf: output, pos: 0 };

        while !out.is_full() {
            let Some(code) = reader.read_code(self.code_width) else {
                trace!("LZW input exhausted after {} bytes", reader.bytes_consumed());
                break;
            };

            match code {
                END_OF_DATA => break,
                CLEAR_CODE => {
                    trace!("LZW clear at output offset {}", out.pos);
                    self.reset();
                }
                _ => {
                    if !self.expand(code, &mut out) {
                        break;
                    }
                }
            }
        }

        out.pos
    }

    /// Emit the string for `code` and extend the dictionary
    ///
    /// Returns `false` if the code cannot be resolved.
    fn expand(&mut self, code: u16, out: &mut OutputCursor<'_>) -> bool {
        let Some(old_code) = self.old_code else {
            // First code after a reset is a plain literal
            if code > 0xFF {
                trace!("LZW non-literal code {code} after reset");
                return false;
            }
            out.put(code as u8);
            self.old_code = Some(code);
            self.old_first = code as u8;
            return true;
        };

        self.stack.clear();
        let mut chain = code;
        if code >= self.dictionary.free_index() {
            // KwKwK: previous string extended by its own first byte
            self.stack.push(self.old_first);
            chain = old_code;
        }

        let Some(first) = self.dictionary.unwind(chain, &mut self.stack) else {
            trace!("LZW chain for code {code} overflowed the scratch stack");
            return false;
        };

        out.put(first);
        while let Some(byte) = self.stack.pop() {
            out.put(byte);
        }

        if self.dictionary.insert(old_code, first)
            && self.dictionary.free_index() >= self.max_index
            && self.code_width < MAX_CODE_WIDTH
        {
            self.code_width += 1;
            self.max_index <<= 1;
            trace!("LZW code width now {} bits", self.code_width);
        }

        self.old_code = Some(code);
        self.old_first = first;
        true
    }
}

impl Default for LzwDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lzw::FIRST_FREE_CODE;

    /// Pack codes with an explicit width per code
    fn pack(codes: &[(u16, u32)]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut acc = 0u64;
        let mut count = 0u32;
        for &(code, width) in codes {
            acc |= u64::from(code) << count;
            count += width;
            while count >= 8 {
                out.push(acc as u8);
                acc >>= 8;
                count -= 8;
            }
        }
        if count > 0 {
            out.push(acc as u8);
        }
        out
    }

    #[test]
    fn test_width_grows_at_512() {
        // First literal, then 254 more literals fill 258..=511 (free reaches 512)
        let mut codes = vec![(u16::from(b'x'), 9)];
        for _ in 0..254 {
            codes.push((u16::from(b'y'), 9));
        }
        // From here on codes are 10 bits wide
        codes.push((u16::from(b'z'), 10));
        codes.push((END_OF_DATA, 10));
        let stream = pack(&codes);

        let mut decoder = LzwDecoder::new();
        let mut output = vec![0u8; 512];
        let written = decoder.decode(&stream, &mut output);

        assert_eq!(written, 256);
        assert_eq!(output[0], b'x');
        assert!(output[1..255].iter().all(|&b| b == b'y'));
        assert_eq!(output[255], b'z');
        assert_eq!(decoder.code_width(), 10);
    }

    #[test]
    fn test_non_literal_after_clear_stops() {
        let stream = pack(&[
            (u16::from(b'A'), 9),
            (CLEAR_CODE, 9),
            (FIRST_FREE_CODE + 3, 9),
            (u16::from(b'B'), 9),
        ]);
        let mut output = [0u8; 8];
        assert_eq!(LzwDecoder::new().decode(&stream, &mut output), 1);
        assert_eq!(output[0], b'A');
    }

    #[test]
    fn test_decoder_reusable() {
        let stream = pack(&[(u16::from(b'Q'), 9), (258, 9), (END_OF_DATA, 9)]);
        let mut decoder = LzwDecoder::new();
        let mut first = [0u8; 8];
        let mut second = [0u8; 8];
        let a = decoder.decode(&stream, &mut first);
        let b = decoder.decode(&stream, &mut second);
        assert_eq!(a, 3);
        assert_eq!(first[..a], second[..b]);
    }
}
