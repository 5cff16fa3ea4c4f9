//! Shape strips: tables of run-length encoded sprite frames
//!
//! Shape strips are found inside decoded PAK packets. Each frame is an
//! indexed-colour bitmap with a hotspot; palette index 0 is transparent.
//!
//! ```
//! use mcgarc::shape::ShapeStrip;
//!
//! let mut data = b"1.10".to_vec();
//! data.extend_from_slice(&1u32.to_le_bytes()); // frame count
//! data.extend_from_slice(&12u32.to_le_bytes()); // frame 0 offset
//! for field in [0i32, 0, 0, 0, 0, 0] {
//!     data.extend_from_slice(&field.to_le_bytes()); // 1x1 bounds
//! }
//! data.extend_from_slice(&[0x03, 0x05, 0x00]);
//!
//! let strip = ShapeStrip::load(data)?;
//! let frame = strip.decode_frame(0)?;
//! assert_eq!(frame.pixel(0, 0), 5);
//! # Ok::<(), mcgarc::ArchiveError>(())
//! ```

mod pack;
mod rle;
mod strip;

pub use pack::{looks_like_shape_strip, ShapePack};
pub use rle::decode_rle;
pub use strip::{FrameHeader, ShapeFrame, ShapeStrip};
