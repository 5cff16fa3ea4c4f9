//! PakContainer - packet container reader

use super::slot::{StorageType, TableSlot};
use crate::codec;
use crate::common::{ArchiveError, ArchiveOptions, Result, PAK_HEADER_SIZE, PAK_MAGIC};
use crate::extract::{write_output, ExtractProgress, ExtractSummary};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace, warn};
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// One packet in the seek table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PakEntry {
    /// Table position
    pub index: usize,
    /// Absolute offset of the packet within the container
    pub offset: u32,
    /// How the payload is stored
    pub storage_type: StorageType,
    /// Bytes between this packet and the next one
    pub packed_size: u32,
    /// Decoded size; read from the size prefix for compressed packets
    pub unpacked_size: u32,
}

impl PakEntry {
    /// True if the packet is stored as `Null`
    pub fn is_null(&self) -> bool {
        self.storage_type == StorageType::Null
    }
}

/// An open PAK container
///
/// Nested containers opened with [`PakContainer::nested`] are held in memory
/// and remember how deep they sit below the outermost file.
#[derive(Debug)]
pub struct PakContainer<R = BufReader<File>> {
    reader: R,
    entries: Vec<PakEntry>,
    source_len: u64,
    source_path: Option<PathBuf>,
    has_magic: bool,
    depth: usize,
    options: ArchiveOptions,
}

impl PakContainer<BufReader<File>> {
    /// Open a container file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ArchiveOptions::default())
    }

    /// Open a container file with custom options
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ArchiveOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut container = Self::from_reader_with_options(BufReader::new(file), options)?;
        container.source_path = Some(path.to_path_buf());
        debug!(
            "Opened {} with {} packets",
            path.display(),
            container.packet_count()
        );
        Ok(container)
    }

    /// Path the container was opened from
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

impl PakContainer<Cursor<Vec<u8>>> {
    /// Parse a container held in memory
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }
}

impl<R: Read + Seek> PakContainer<R> {
    /// Parse a container from any seekable reader with default options
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ArchiveOptions::default())
    }

    /// Parse a container from any seekable reader
    ///
    /// A wrong magic is only logged unless `strict_magic` is set. The entry
    /// count comes from the first slot: the header and table together occupy
    /// exactly the bytes in front of the first packet.
    pub fn from_reader_with_options(mut reader: R, options: ArchiveOptions) -> Result<Self> {
        let source_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if source_len < u64::from(PAK_HEADER_SIZE) {
            return Err(ArchiveError::TruncatedArchive {
                needed: u64::from(PAK_HEADER_SIZE),
                available: source_len,
            });
        }

        let magic = reader.read_u32::<LittleEndian>()?;
        let has_magic = magic == PAK_MAGIC;
        if !has_magic {
            if options.strict_magic {
                return Err(ArchiveError::CorruptHeader(format!(
                    "bad PAK magic 0x{magic:08X}"
                )));
            }
            warn!("PAK magic mismatch: 0x{magic:08X}, continuing");
        }

        let first_offset = TableSlot(reader.read_u32::<LittleEndian>()?).offset();
        if first_offset < PAK_HEADER_SIZE {
            return Err(ArchiveError::CorruptHeader(format!(
                "first packet offset {first_offset} lies inside the header"
            )));
        }

        let count = first_offset / 4 - 2;
        if count > options.max_pak_entries {
            return Err(ArchiveError::CorruptHeader(format!(
                "PAK packet count {count} exceeds limit {}",
                options.max_pak_entries
            )));
        }
        if u64::from(first_offset) > source_len {
            return Err(ArchiveError::TruncatedArchive {
                needed: u64::from(first_offset),
                available: source_len,
            });
        }

        let mut slots = vec![0u32; count as usize];
        reader.read_u32_into::<LittleEndian>(&mut slots)?;

        let mut entries = Vec::with_capacity(slots.len());
        for (index, &raw) in slots.iter().enumerate() {
            let slot = TableSlot(raw);
            let offset = slot.offset();
            let end = match slots.get(index + 1) {
                Some(&next) => u64::from(TableSlot(next).offset()),
                None => source_len,
            };
            let storage_type = slot.storage_type();
            let packed_size = if storage_type == StorageType::Null {
                0
            } else {
                end.saturating_sub(u64::from(offset)).min(u64::from(u32::MAX)) as u32
            };

            let unpacked_size = match storage_type {
                StorageType::Raw | StorageType::FileWithinFile => packed_size,
                StorageType::Lzw | StorageType::Deflate => {
                    read_size_prefix(&mut reader, source_len, offset, packed_size)?
                }
                StorageType::Huffman | StorageType::Reserved(_) | StorageType::Null => 0,
            };

            trace!(
                "packet {index}: {} at 0x{offset:X}, {packed_size} -> {unpacked_size}",
                storage_type.label()
            );
            entries.push(PakEntry {
                index,
                offset,
                storage_type,
                packed_size,
                unpacked_size,
            });
        }

        Ok(Self {
            reader,
            entries,
            source_len,
            source_path: None,
            has_magic,
            depth: 0,
            options,
        })
    }

    /// Number of packets in the seek table
    pub fn packet_count(&self) -> usize {
        self.entries.len()
    }

    /// All packets in table order
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Table entry for `index`
    pub fn entry(&self, index: usize) -> Option<&PakEntry> {
        self.entries.get(index)
    }

    /// Storage type of packet `index`
    pub fn storage_type(&self, index: usize) -> Option<StorageType> {
        self.entry(index).map(|entry| entry.storage_type)
    }

    /// Decoded size of packet `index`
    pub fn unpacked_size(&self, index: usize) -> Option<u32> {
        self.entry(index).map(|entry| entry.unpacked_size)
    }

    /// True if the header carried the expected magic
    pub fn has_magic(&self) -> bool {
        self.has_magic
    }

    /// Number of containers above this one; 0 for a top-level file
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Total size of the underlying source
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    /// Options the container was opened with
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    fn checked_entry(&self, index: usize) -> Result<PakEntry> {
        self.entries
            .get(index)
            .copied()
            .ok_or(ArchiveError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    /// Read the packet's bytes exactly as stored, size prefix included
    ///
    /// `Null` packets carry no payload and return an empty buffer.
    pub fn read_packet_raw(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self.checked_entry(index)?;
        if entry.is_null() {
            return Ok(Vec::new());
        }
        self.read_span(u64::from(entry.offset), entry.packed_size)
    }

    /// Read and decode packet `index`
    ///
    /// `Null` packets return an empty buffer without touching the reader.
    pub fn read_packet(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self.checked_entry(index)?;

        match entry.storage_type {
            StorageType::Null => Ok(Vec::new()),
            StorageType::Raw | StorageType::FileWithinFile => {
                self.read_span(u64::from(entry.offset), entry.packed_size)
            }
            StorageType::Lzw | StorageType::Deflate => self.read_compressed(&entry),
            other => Err(ArchiveError::UnsupportedStorageType(other)),
        }
    }

    fn read_compressed(&mut self, entry: &PakEntry) -> Result<Vec<u8>> {
        if entry.packed_size < 4 {
            return Err(ArchiveError::TruncatedArchive {
                needed: u64::from(entry.offset) + 4,
                available: self.source_len,
            });
        }
        let end = u64::from(entry.offset) + u64::from(entry.packed_size);
        if end > self.source_len {
            return Err(ArchiveError::TruncatedArchive {
                needed: end,
                available: self.source_len,
            });
        }
        if entry.unpacked_size > self.options.max_unpacked_size {
            return Err(ArchiveError::SizeLimitExceeded {
                declared: u64::from(entry.unpacked_size),
                limit: u64::from(self.options.max_unpacked_size),
            });
        }
        if entry.unpacked_size == 0 {
            return Ok(Vec::new());
        }

        let payload = self.read_span(u64::from(entry.offset) + 4, entry.packed_size - 4)?;
        let Some(scheme) = entry.storage_type.scheme() else {
            return Err(ArchiveError::UnsupportedStorageType(entry.storage_type));
        };

        let expected = entry.unpacked_size as usize;
        let data = codec::decompress(&payload, expected, scheme);
        if data.is_empty() {
            return Err(ArchiveError::DecompressionFailed { expected });
        }
        Ok(data)
    }

    fn read_span(&mut self, offset: u64, len: u32) -> Result<Vec<u8>> {
        let end = offset + u64::from(len);
        if end > self.source_len {
            return Err(ArchiveError::TruncatedArchive {
                needed: end,
                available: self.source_len,
            });
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; len as usize];
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Open packet `index` as a PAK container of its own
    ///
    /// Fails with [`ArchiveError::NotNested`] when the decoded packet does not
    /// start with the PAK magic, and with [`ArchiveError::NestingTooDeep`] once
    /// `max_nesting_depth` levels are open.
    pub fn nested(&mut self, index: usize) -> Result<PakContainer<Cursor<Vec<u8>>>> {
        let depth = self.depth + 1;
        if depth > self.options.max_nesting_depth {
            return Err(ArchiveError::NestingTooDeep(self.options.max_nesting_depth));
        }

        let data = self.read_packet(index)?;
        if !super::is_pak_magic(&data) {
            return Err(ArchiveError::NotNested(index));
        }

        let mut inner =
            PakContainer::from_reader_with_options(Cursor::new(data), self.options.clone())?;
        inner.depth = depth;
        Ok(inner)
    }

    /// Decode every packet into `output_dir` as `{prefix}{index:05}.bin`
    ///
    /// `Null` packets are passed over silently; packets that fail to read are
    /// skipped and recorded in the summary.
    pub fn extract_all<F>(
        &mut self,
        output_dir: &Path,
        prefix: &str,
        mut progress: F,
    ) -> Result<ExtractSummary>
    where
        F: FnMut(&ExtractProgress),
    {
        fs::create_dir_all(output_dir)?;
        let mut summary = ExtractSummary::default();
        let total = self.entries.len();

        for index in 0..total {
            let name = format!("{prefix}{index:05}.bin");
            progress(&ExtractProgress::new(index + 1, total, name.as_str()));

            if self.entries[index].is_null() {
                continue;
            }

            let result = self
                .read_packet(index)
                .and_then(|data| write_output(&output_dir.join(&name), &data));
            match result {
                Ok(()) => summary.extracted += 1,
                Err(e) => summary.skip(name, e),
            }
        }

        Ok(summary)
    }
}

/// Read the 4-byte uncompressed size in front of a compressed payload
///
/// A prefix that would lie past the end of the source yields 0; reading that
/// packet later reports the truncation.
fn read_size_prefix<R: Read + Seek>(
    reader: &mut R,
    source_len: u64,
    offset: u32,
    packed_size: u32,
) -> Result<u32> {
    if packed_size < 4 || u64::from(offset) + 4 > source_len {
        return Ok(0);
    }
    reader.seek(SeekFrom::Start(u64::from(offset)))?;
    Ok(reader.read_u32::<LittleEndian>()?)
}
