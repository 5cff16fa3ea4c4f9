//! Shape strips collected from a PAK container

use super::strip::ShapeStrip;
use crate::common::{ArchiveError, Result};
use crate::pak::PakContainer;
use log::{debug, warn};
use std::io::{Read, Seek};

/// True if `data` starts with a version tag made of digits and dots
pub fn looks_like_shape_strip(data: &[u8]) -> bool {
    data.len() >= 8
        && data[..4]
            .iter()
            .all(|&b| b == b'.' || b.is_ascii_digit())
}

/// Every shape strip found in one container
#[derive(Debug, Clone, Default)]
pub struct ShapePack {
    tables: Vec<ShapeStrip>,
}

impl ShapePack {
    /// Wrap already loaded strips
    pub fn from_strips(tables: Vec<ShapeStrip>) -> Self {
        Self { tables }
    }

    /// Load every packet that carries a shape strip version tag
    ///
    /// When no packet has one, packet 0 is tried as a single strip.
    pub fn from_container<R: Read + Seek>(pak: &mut PakContainer<R>) -> Result<Self> {
        if pak.packet_count() == 0 {
            return Err(ArchiveError::CorruptHeader(
                "container has no packets".to_string(),
            ));
        }

        let options = pak.options().clone();
        let mut tables = Vec::new();
        for index in 0..pak.packet_count() {
            let data = match pak.read_packet(index) {
                Ok(data) => data,
                Err(e) => {
                    debug!("packet {index}: {e}");
                    continue;
                }
            };
            if !looks_like_shape_strip(&data) {
                continue;
            }
            match ShapeStrip::load_with_options(data, &options) {
                Ok(strip) => tables.push(strip),
                Err(e) => warn!("packet {index}: tagged as a shape strip but {e}"),
            }
        }

        if tables.is_empty() {
            let data = pak.read_packet(0)?;
            tables.push(ShapeStrip::load_with_options(data, &options)?);
        }

        debug!("Loaded {} shape strips", tables.len());
        Ok(Self { tables })
    }

    /// Number of strips
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Strip `index`
    pub fn table(&self, index: usize) -> Option<&ShapeStrip> {
        self.tables.get(index)
    }

    /// All strips in packet order
    pub fn tables(&self) -> &[ShapeStrip] {
        &self.tables
    }

    /// Sum of frame counts over every strip
    pub fn total_frame_count(&self) -> usize {
        self.tables.iter().map(ShapeStrip::frame_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_tag_check() {
        assert!(looks_like_shape_strip(b"1.10\x00\x00\x00\x00"));
        assert!(looks_like_shape_strip(b"0000\x01\x00\x00\x00"));
        assert!(!looks_like_shape_strip(b"1.10"));
        assert!(!looks_like_shape_strip(b"v1.1\x00\x00\x00\x00"));
    }
}
