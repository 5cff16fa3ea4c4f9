//! ShapeStrip - frame table over one decoded buffer

use super::rle::decode_rle;
use crate::common::{ArchiveError, ArchiveOptions, Result, SHAPE_FRAME_HEADER_SIZE};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

/// Fixed 24-byte record in front of each frame's pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Packed bounding info, unused by the decoder
    pub bounds: i32,
    /// Hotspot packed as `(x << 16) | y`
    pub origin: i32,
    /// Left edge
    pub xmin: i32,
    /// Top edge
    pub ymin: i32,
    /// Right edge, inclusive
    pub xmax: i32,
    /// Bottom edge, inclusive
    pub ymax: i32,
}

impl FrameHeader {
    /// Parse a header from the first 24 bytes of `bytes`
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < SHAPE_FRAME_HEADER_SIZE {
            return None;
        }
        let mut fields = [0i32; 6];
        LittleEndian::read_i32_into(&bytes[..SHAPE_FRAME_HEADER_SIZE], &mut fields);
        let [bounds, origin, xmin, ymin, xmax, ymax] = fields;
        Some(Self {
            bounds,
            origin,
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// `xmax - xmin + 1`, saturated to the `i32` range
    pub fn width(&self) -> i32 {
        span(self.xmin, self.xmax)
    }

    /// `ymax - ymin + 1`, saturated to the `i32` range
    pub fn height(&self) -> i32 {
        span(self.ymin, self.ymax)
    }

    /// Hotspot column, from the high half of `origin`
    pub fn hotspot_x(&self) -> i16 {
        (self.origin >> 16) as i16
    }

    /// Hotspot row, from the low half of `origin`
    pub fn hotspot_y(&self) -> i16 {
        (self.origin & 0xFFFF) as i16
    }
}

fn span(min: i32, max: i32) -> i32 {
    let span = i64::from(max) - i64::from(min) + 1;
    span.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A decoded frame of 8-bit palette indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Anchor column relative to the frame
    pub hotspot_x: i16,
    /// Anchor row relative to the frame
    pub hotspot_y: i16,
    /// Row-major palette indices, 0 is transparent
    pub pixels: Vec<u8>,
}

impl ShapeFrame {
    /// Palette index at `(x, y)`; 0 outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels.get(index).copied().unwrap_or(0)
    }

    /// One row of pixels
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.pixels.get(start..start + self.width as usize)
    }
}

/// A versioned table of RLE frames
///
/// Layout: 4-byte ASCII version tag, `u32` frame count, then one `u32`
/// absolute offset per frame. Each frame is a [`FrameHeader`] followed by
/// its RLE pixel stream.
#[derive(Debug, Clone)]
pub struct ShapeStrip {
    data: Vec<u8>,
    version: [u8; 4],
    offsets: Vec<u32>,
    max_dimension: i32,
}

impl ShapeStrip {
    /// Parse a strip with default limits
    pub fn load(data: Vec<u8>) -> Result<Self> {
        Self::load_with_options(data, &ArchiveOptions::default())
    }

    /// Parse a strip, rejecting implausible frame counts
    pub fn load_with_options(data: Vec<u8>, options: &ArchiveOptions) -> Result<Self> {
        if data.len() < 8 {
            return Err(ArchiveError::TruncatedArchive {
                needed: 8,
                available: data.len() as u64,
            });
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&data[..4]);
        let count = LittleEndian::read_u32(&data[4..8]);
        if count > options.max_shape_frames {
            return Err(ArchiveError::CorruptHeader(format!(
                "shape frame count {count} exceeds limit {}",
                options.max_shape_frames
            )));
        }

        let table_end = 8 + u64::from(count) * 4;
        if table_end > data.len() as u64 {
            return Err(ArchiveError::TruncatedArchive {
                needed: table_end,
                available: data.len() as u64,
            });
        }

        let mut offsets = vec![0u32; count as usize];
        LittleEndian::read_u32_into(&data[8..table_end as usize], &mut offsets);
        debug!(
            "Shape strip {:?} with {count} frames",
            String::from_utf8_lossy(&version)
        );

        Ok(Self {
            data,
            version,
            offsets,
            max_dimension: options.max_shape_dimension,
        })
    }

    /// Version tag as text, e.g. `1.10`
    pub fn version(&self) -> String {
        String::from_utf8_lossy(&self.version).into_owned()
    }

    /// Raw version tag bytes
    pub fn version_bytes(&self) -> [u8; 4] {
        self.version
    }

    /// Number of frames in the table
    pub fn frame_count(&self) -> usize {
        self.offsets.len()
    }

    /// Absolute frame offsets
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// The whole strip buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, index: usize) -> Result<usize> {
        self.offsets
            .get(index)
            .map(|&offset| offset as usize)
            .ok_or(ArchiveError::IndexOutOfRange {
                index,
                count: self.offsets.len(),
            })
    }

    /// Header of frame `index`
    pub fn frame_header(&self, index: usize) -> Result<FrameHeader> {
        let offset = self.offset(index)?;
        self.data
            .get(offset..)
            .and_then(FrameHeader::parse)
            .ok_or(ArchiveError::TruncatedArchive {
                needed: offset as u64 + SHAPE_FRAME_HEADER_SIZE as u64,
                available: self.data.len() as u64,
            })
    }

    /// Bytes of frame `index`, header included
    ///
    /// A frame runs up to the next frame's offset, or to the end of the
    /// buffer for the last frame or when the next offset does not follow it.
    pub fn raw_frame(&self, index: usize) -> Result<&[u8]> {
        let offset = self.offset(index)?;
        if offset >= self.data.len() {
            return Err(ArchiveError::TruncatedArchive {
                needed: offset as u64 + 1,
                available: self.data.len() as u64,
            });
        }

        let end = match self.offsets.get(index + 1) {
            Some(&next) if next as usize > offset => (next as usize).min(self.data.len()),
            _ => self.data.len(),
        };
        Ok(&self.data[offset..end])
    }

    /// Decode frame `index` into pixels
    ///
    /// A short RLE stream is not an error; undecoded pixels stay transparent.
    pub fn decode_frame(&self, index: usize) -> Result<ShapeFrame> {
        let header = self.frame_header(index)?;
        let (width, height) = (header.width(), header.height());
        if width <= 0 || height <= 0 || width > self.max_dimension || height > self.max_dimension
        {
            return Err(ArchiveError::InvalidShapeDimensions { width, height });
        }

        let raw = self.raw_frame(index)?;
        let rle = raw.get(SHAPE_FRAME_HEADER_SIZE..).unwrap_or(&[]);
        let (w, h) = (width as usize, height as usize);
        let mut pixels = vec![0u8; w * h];
        let consumed = decode_rle(rle, &mut pixels, w, h);
        trace!(
            "frame {index}: {width}x{height}, {consumed} of {} RLE bytes",
            rle.len()
        );

        Ok(ShapeFrame {
            width: width as u32,
            height: height as u32,
            hotspot_x: header.hotspot_x(),
            hotspot_y: header.hotspot_y(),
            pixels,
        })
    }

    /// Decode every frame, keeping failures in place
    pub fn frames(&self) -> impl Iterator<Item = Result<ShapeFrame>> + '_ {
        (0..self.frame_count()).map(move |index| self.decode_frame(index))
    }
}
