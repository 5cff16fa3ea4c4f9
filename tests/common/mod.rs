//! Shared builders for integration tests
//!
//! Synthetic FST, PAK and shape strip buffers, plus a small LZW encoder that
//! produces streams the crate's decoder accepts.

#![allow(dead_code)]

use mcgarc::common::{FST_ENTRY_SIZE, PAK_MAGIC};
use mcgarc::lzw::{CLEAR_CODE, END_OF_DATA, FIRST_FREE_CODE, MAX_CODE_COUNT};
use mcgarc::pak::TableSlot;
use std::collections::HashMap;

/// Storage type tags as stored in the top three slot bits
pub const RAW: u8 = 0;
pub const FILE_WITHIN_FILE: u8 = 1;
pub const LZW: u8 = 2;
pub const HUFFMAN: u8 = 3;
pub const DEFLATE: u8 = 4;
pub const NULL: u8 = 7;

struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    bits: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            acc: 0,
            bits: 0,
        }
    }

    fn write(&mut self, code: u16, width: u32) {
        self.acc |= u32::from(code) << self.bits;
        self.bits += width;
        while self.bits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }
}

/// Encoder side of the variable-width LZW scheme
///
/// Tracks the decoder's free index to know when the code width grows, and
/// emits Clear whenever its own dictionary is full.
struct LzwEncoder {
    writer: BitWriter,
    width: u32,
    max_index: u32,
    decoder_free: u32,
    awaiting_literal: bool,
    dictionary: HashMap<(u16, u8), u16>,
    next_code: u32,
}

impl LzwEncoder {
    fn new() -> Self {
        Self {
            writer: BitWriter::new(),
            width: 9,
            max_index: 512,
            decoder_free: u32::from(FIRST_FREE_CODE),
            awaiting_literal: true,
            dictionary: HashMap::new(),
            next_code: u32::from(FIRST_FREE_CODE),
        }
    }

    fn emit(&mut self, code: u16) {
        self.writer.write(code, self.width);
        if code == CLEAR_CODE {
            self.width = 9;
            self.max_index = 512;
            self.decoder_free = u32::from(FIRST_FREE_CODE);
            self.awaiting_literal = true;
            self.dictionary.clear();
            self.next_code = u32::from(FIRST_FREE_CODE);
            return;
        }
        if code == END_OF_DATA {
            return;
        }

        if self.awaiting_literal {
            self.awaiting_literal = false;
            return;
        }
        if self.decoder_free < u32::from(MAX_CODE_COUNT) {
            self.decoder_free += 1;
            if self.decoder_free >= self.max_index && self.width < 12 {
                self.width += 1;
                self.max_index <<= 1;
            }
        }
    }

    fn encode(mut self, data: &[u8]) -> Vec<u8> {
        self.emit(CLEAR_CODE);

        let mut current: Option<u16> = None;
        for &byte in data {
            let Some(prefix) = current else {
                current = Some(u16::from(byte));
                continue;
            };
            if let Some(&code) = self.dictionary.get(&(prefix, byte)) {
                current = Some(code);
                continue;
            }

            self.emit(prefix);
            if self.next_code < u32::from(MAX_CODE_COUNT) {
                self.dictionary.insert((prefix, byte), self.next_code as u16);
                self.next_code += 1;
            }
            current = Some(u16::from(byte));

            if self.next_code >= u32::from(MAX_CODE_COUNT) {
                self.emit(CLEAR_CODE);
            }
        }

        if let Some(prefix) = current {
            self.emit(prefix);
        }
        self.emit(END_OF_DATA);
        self.writer.finish()
    }
}

/// LZW-compress `data` into a stream starting with Clear and ending with EndOfData
pub fn lzw_compress(data: &[u8]) -> Vec<u8> {
    LzwEncoder::new().encode(data)
}

/// zlib-compress `data`
#[cfg(feature = "zlib")]
pub fn zlib_compress(data: &[u8]) -> Vec<u8> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Deterministic, mildly repetitive test data
pub fn sample_data(len: usize) -> Vec<u8> {
    let words: [&[u8]; 5] = [b"MECH ", b"COMMANDER ", b"GOLD ", b"MISSION ", b"\x00\x01\x02"];
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[i % words.len()]);
        out.push((i * 37 % 251) as u8);
        i += 1;
    }
    out.truncate(len);
    out
}

/// One file for [`build_fst`]
pub struct FstFile<'a> {
    pub path: &'a str,
    pub data: &'a [u8],
    pub compress: bool,
}

impl<'a> FstFile<'a> {
    pub fn stored(path: &'a str, data: &'a [u8]) -> Self {
        Self {
            path,
            data,
            compress: false,
        }
    }

    pub fn compressed(path: &'a str, data: &'a [u8]) -> Self {
        Self {
            path,
            data,
            compress: true,
        }
    }
}

/// Build an FST archive in memory
pub fn build_fst(files: &[FstFile<'_>]) -> Vec<u8> {
    // A packer keeps the raw bytes when compression does not pay off
    let payloads: Vec<(bool, Vec<u8>)> = files
        .iter()
        .map(|file| {
            let packed = if file.compress {
                lzw_compress(file.data)
            } else {
                Vec::new()
            };
            if file.compress && packed.len() < file.data.len() {
                (true, packed)
            } else {
                (false, file.data.to_vec())
            }
        })
        .collect();

    let mut out = (files.len() as u32).to_le_bytes().to_vec();
    let mut offset = 4 + files.len() * FST_ENTRY_SIZE;
    for (file, (compressed, payload)) in files.iter().zip(&payloads) {
        let mut record = [0u8; FST_ENTRY_SIZE];
        let packed = if *compressed { payload.len() } else { 0 };
        record[0..4].copy_from_slice(&(offset as u32).to_le_bytes());
        record[4..8].copy_from_slice(&(packed as u32).to_le_bytes());
        record[8..12].copy_from_slice(&(file.data.len() as u32).to_le_bytes());
        record[12..12 + file.path.len()].copy_from_slice(file.path.as_bytes());
        out.extend_from_slice(&record);
        offset += payload.len();
    }
    for (_, payload) in &payloads {
        out.extend_from_slice(payload);
    }
    out
}

/// Build a PAK container from `(type tag, stored bytes)` pairs
///
/// Payloads are written as given; use [`size_prefixed`] for compressed ones.
pub fn build_pak(packets: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let header = 8 + 4 * packets.len() as u32;
    let mut out = PAK_MAGIC.to_le_bytes().to_vec();
    out.extend_from_slice(&header.to_le_bytes());

    let mut offset = header;
    for (tag, payload) in packets {
        out.extend_from_slice(&TableSlot::pack(offset, *tag).0.to_le_bytes());
        offset += payload.len() as u32;
    }
    for (_, payload) in packets {
        out.extend_from_slice(payload);
    }
    out
}

/// Prepend the 4-byte uncompressed size used by `Lzw` and `Deflate` packets
pub fn size_prefixed(unpacked_len: usize, compressed: &[u8]) -> Vec<u8> {
    let mut out = (unpacked_len as u32).to_le_bytes().to_vec();
    out.extend_from_slice(compressed);
    out
}

/// A frame for [`build_shape_strip`]
pub struct TestFrame<'a> {
    pub width: i32,
    pub height: i32,
    pub hotspot: (i16, i16),
    pub rle: &'a [u8],
}

/// Build a shape strip with one 4-byte offset per frame
pub fn build_shape_strip(version: &[u8; 4], frames: &[TestFrame<'_>]) -> Vec<u8> {
    let mut records = Vec::new();
    for frame in frames {
        let origin = (i32::from(frame.hotspot.0) << 16) | i32::from(frame.hotspot.1 as u16);
        let mut record = Vec::new();
        for field in [0, origin, 0, 0, frame.width - 1, frame.height - 1] {
            record.extend_from_slice(&field.to_le_bytes());
        }
        record.extend_from_slice(frame.rle);
        records.push(record);
    }

    let mut out = version.to_vec();
    out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    let mut offset = 8 + 4 * frames.len() as u32;
    for record in &records {
        out.extend_from_slice(&offset.to_le_bytes());
        offset += record.len() as u32;
    }
    for record in &records {
        out.extend_from_slice(record);
    }
    out
}
