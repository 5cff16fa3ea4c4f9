//! Row-oriented run-length pixel decoding
//!
//! Marker bytes:
//!
//! - `0`: end of row
//! - `1, n`: skip `n` transparent pixels
//! - odd `m`: copy the next `m >> 1` bytes
//! - even `m`: repeat the next byte `m >> 1` times

const END_OF_ROW: u8 = 0;
const SKIP: u8 = 1;

/// Decode an RLE stream into a `width * height` pixel buffer
///
/// Pixels that fall outside the row are dropped. Decoding stops once
/// `height` rows are complete or the input runs out; a truncated stream
/// leaves the remaining pixels untouched. Returns the number of input bytes
/// consumed.
pub fn decode_rle(src: &[u8], dest: &mut [u8], width: usize, height: usize) -> usize {
    let mut pos = 0;
    let mut x = 0usize;
    let mut y = 0usize;

    let mut put = |x: usize, y: usize, value: u8| {
        if x < width && y < height {
            if let Some(pixel) = dest.get_mut(y * width + x) {
                *pixel = value;
            }
        }
    };

    while pos < src.len() && y < height {
        let marker = src[pos];
        pos += 1;

        match marker {
            END_OF_ROW => {
                x = 0;
                y += 1;
            }
            SKIP => {
                let Some(&count) = src.get(pos) else {
                    break;
                };
                pos += 1;
                x += usize::from(count);
            }
            m if m & 1 == 1 => {
                let count = usize::from(m >> 1);
                let end = (pos + count).min(src.len());
                for &value in &src[pos..end] {
                    put(x, y, value);
                    x += 1;
                }
                pos = end;
            }
            m => {
                let Some(&value) = src.get(pos) else {
                    break;
                };
                pos += 1;
                for _ in 0..(m >> 1) {
                    put(x, y, value);
                    x += 1;
                }
            }
        }
    }

    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(src: &[u8], width: usize, height: usize) -> Vec<u8> {
        let mut dest = vec![0u8; width * height];
        decode_rle(src, &mut dest, width, height);
        dest
    }

    #[test]
    fn test_single_literal() {
        assert_eq!(decode(&[0x03, 0x05, 0x00], 1, 1), [0x05]);
    }

    #[test]
    fn test_repeat_and_skip() {
        // Row 0: skip 1, repeat 0x07 twice. Row 1: literal 9, 8, 7
        let src = [0x01, 0x01, 0x04, 0x07, 0x00, 0x07, 9, 8, 7, 0x00];
        assert_eq!(decode(&src, 3, 2), [0, 7, 7, 9, 8, 7]);
    }

    #[test]
    fn test_overlong_row_clipped() {
        let src = [0x0A, 0x02, 0x00, 0x03, 0x04];
        assert_eq!(decode(&src, 2, 2), [2, 2, 4, 0]);
    }

    #[test]
    fn test_stops_after_height_rows() {
        let src = [0x03, 0x01, 0x00, 0x03, 0x02, 0x00];
        let mut dest = vec![0u8; 1];
        assert_eq!(decode_rle(&src, &mut dest, 1, 1), 3);
        assert_eq!(dest, [1]);
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(decode(&[0x07, 1, 2], 4, 1), [1, 2, 0, 0]);
        assert_eq!(decode(&[0x04], 2, 1), [0, 0]);
        assert_eq!(decode(&[0x01], 2, 1), [0, 0]);
        assert_eq!(decode(&[], 2, 1), [0, 0]);
    }
}
