//! Recursive traversal of nested containers

use super::container::{PakContainer, PakEntry};
use super::is_pak_magic;
use crate::common::Result;
use log::{debug, warn};
use std::io::{Read, Seek};

/// One packet found while walking a container tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedPacket {
    /// Packet indices from the outermost container down to this packet
    pub path: Vec<usize>,
    /// The packet's table entry in its own container
    pub entry: PakEntry,
    /// Packet count when the payload is itself a container
    pub nested_count: Option<usize>,
}

impl NestedPacket {
    /// Nesting level, 0 for packets of the outermost container
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Dotted index path such as `3.0.12`
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl<R: Read + Seek> PakContainer<R> {
    /// List every packet, descending into nested containers
    ///
    /// Recursion stops `max_depth` levels below this container or at the
    /// configured nesting limit, whichever is lower. Packets that fail to
    /// decode are listed without descending into them.
    pub fn walk(&mut self, max_depth: usize) -> Result<Vec<NestedPacket>> {
        let limit = max_depth.min(self.options().max_nesting_depth);
        let mut found = Vec::new();
        walk_level(self, &mut Vec::new(), limit, &mut found);
        Ok(found)
    }
}

fn walk_level<R: Read + Seek>(
    container: &mut PakContainer<R>,
    path: &mut Vec<usize>,
    remaining: usize,
    found: &mut Vec<NestedPacket>,
) {
    for index in 0..container.packet_count() {
        let Some(entry) = container.entry(index).copied() else {
            break;
        };
        path.push(index);

        let mut nested_count = None;
        let mut child = None;
        if !entry.is_null() {
            match container.read_packet(index) {
                Ok(data) if is_pak_magic(&data) => {
                    match PakContainer::from_reader_with_options(
                        std::io::Cursor::new(data),
                        container.options().clone(),
                    ) {
                        Ok(inner) => {
                            nested_count = Some(inner.packet_count());
                            child = Some(inner);
                        }
                        Err(e) => warn!("packet {index}: magic present but not a container: {e}"),
                    }
                }
                Ok(_) => {}
                Err(e) => debug!("packet {index}: {e}"),
            }
        }

        found.push(NestedPacket {
            path: path.clone(),
            entry,
            nested_count,
        });

        if let Some(mut inner) = child {
            if remaining > 0 {
                walk_level(&mut inner, path, remaining - 1, found);
            } else {
                debug!("not descending into packet {index}: depth limit reached");
            }
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ArchiveOptions, PAK_MAGIC};
    use crate::pak::TableSlot;

    fn build(packets: &[(u8, &[u8])]) -> Vec<u8> {
        let header = 8 + 4 * packets.len() as u32;
        let mut out = PAK_MAGIC.to_le_bytes().to_vec();
        out.extend_from_slice(&header.to_le_bytes());
        let mut offset = header;
        for (type_bits, data) in packets {
            out.extend_from_slice(&TableSlot::pack(offset, *type_bits).0.to_le_bytes());
            offset += data.len() as u32;
        }
        for (_, data) in packets {
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn test_walk_tree() -> Result<()> {
        let leaf = build(&[(0, b"a"), (0, b"b")]);
        let middle = build(&[(1, &leaf), (7, b"")]);
        let top = build(&[(0, b"x"), (1, &middle)]);

        let mut pak = PakContainer::from_bytes(top)?;
        let found = pak.walk(8)?;
        let paths: Vec<String> = found.iter().map(NestedPacket::path_string).collect();
        assert_eq!(paths, ["0", "1", "1.0", "1.0.0", "1.0.1", "1.1"]);
        assert_eq!(found[1].nested_count, Some(2));
        assert_eq!(found[2].nested_count, Some(2));
        assert_eq!(found[3].depth(), 2);
        Ok(())
    }

    #[test]
    fn test_walk_depth_limit() -> Result<()> {
        let leaf = build(&[(0, b"a")]);
        let top = build(&[(1, &build(&[(1, &leaf)]))]);

        let mut pak = PakContainer::from_bytes(top.clone())?;
        let shallow = pak.walk(0)?;
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow[0].nested_count, Some(1));

        let options = ArchiveOptions::default().with_max_nesting_depth(1);
        let mut pak = PakContainer::from_reader_with_options(std::io::Cursor::new(top), options)?;
        assert_eq!(pak.walk(10)?.len(), 2);
        Ok(())
    }
}
