//! FstArchive - flat file table reader
//!
//! This module implements the archive handle: header and table parsing,
//! path lookup, reading and LZW decompression of single files, and batch
//! extraction to disk.

use super::entry::{normalize_path, FstEntry};
use crate::codec::{self, CompressionScheme};
use crate::common::{ArchiveError, ArchiveOptions, Result, FST_ENTRY_SIZE};
use crate::extract::{safe_relative_path, write_output, ExtractProgress, ExtractSummary};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// An open FST archive
///
/// The handle owns its reader; reads seek it, so one handle serves one
/// thread at a time.
#[derive(Debug)]
pub struct FstArchive<R = BufReader<File>> {
    reader: R,
    entries: Vec<FstEntry>,
    source_len: u64,
    source_path: Option<PathBuf>,
    options: ArchiveOptions,
}

impl FstArchive<BufReader<File>> {
    /// Open an archive file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ArchiveOptions::default())
    }

    /// Open an archive file with custom options
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ArchiveOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = Self::from_reader_with_options(BufReader::new(file), options)?;
        archive.source_path = Some(path.to_path_buf());
        debug!("Opened {} with {} entries", path.display(), archive.len());
        Ok(archive)
    }

    /// Path the archive was opened from
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

impl<R: Read + Seek> FstArchive<R> {
    /// Parse an archive from any seekable reader with default options
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ArchiveOptions::default())
    }

    /// Parse an archive from any seekable reader
    ///
    /// Fails without returning a partial archive if the count is implausible
    /// or the table does not fit in the source.
    pub fn from_reader_with_options(mut reader: R, options: ArchiveOptions) -> Result<Self> {
        let source_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if source_len < 4 {
            return Err(ArchiveError::TruncatedArchive {
                needed: 4,
                available: source_len,
            });
        }

        let count = reader.read_u32::<LittleEndian>()?;
        if count > options.max_fst_entries {
            return Err(ArchiveError::CorruptHeader(format!(
                "FST entry count {count} exceeds limit {}",
                options.max_fst_entries
            )));
        }

        let table_len = u64::from(count) * FST_ENTRY_SIZE as u64;
        if 4 + table_len > source_len {
            return Err(ArchiveError::TruncatedArchive {
                needed: 4 + table_len,
                available: source_len,
            });
        }

        let mut entries = Vec::with_capacity(count as usize);
        let mut record = [0u8; FST_ENTRY_SIZE];
        for _ in 0..count {
            reader.read_exact(&mut record)?;
            entries.push(FstEntry::parse(&record));
        }

        Ok(Self {
            reader,
            entries,
            source_len,
            source_path: None,
            options,
        })
    }

    /// All entries in table order
    pub fn entries(&self) -> &[FstEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Options the archive was opened with
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Find an entry by path, ignoring case and separator style
    pub fn find_entry(&self, path: &str) -> Option<&FstEntry> {
        let wanted = normalize_path(path);
        self.entries.iter().find(|entry| entry.matches(&wanted))
    }

    /// Read and, if needed, decompress one entry
    pub fn read_file(&mut self, entry: &FstEntry) -> Result<Vec<u8>> {
        let raw = read_stored(&mut self.reader, self.source_len, entry, &self.options)?;
        unpack(entry, raw)
    }

    /// Read an entry located by path
    pub fn read_file_by_path(&mut self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .find_entry(path)
            .cloned()
            .ok_or_else(|| ArchiveError::EntryNotFound(path.to_string()))?;
        self.read_file(&entry)
    }

    /// Read an entry and write it to `output_path`
    pub fn extract_file(&mut self, entry: &FstEntry, output_path: &Path) -> Result<()> {
        let data = self.read_file(entry)?;
        write_output(output_path, &data)
    }

    /// Extract every entry below `output_dir`
    ///
    /// Unreadable entries are skipped and counted; the batch never aborts
    /// because of a single entry.
    pub fn extract_all<F>(&mut self, output_dir: &Path, mut progress: F) -> ExtractSummary
    where
        F: FnMut(&ExtractProgress),
    {
        let mut summary = ExtractSummary::default();
        let total = self.entries.len();

        for index in 0..total {
            let entry = self.entries[index].clone();
            progress(&ExtractProgress::new(index + 1, total, entry.path.as_str()));

            let Some(relative) = safe_relative_path(&entry.path) else {
                summary.skip(entry.path, "unsafe output path");
                continue;
            };

            match self.extract_file(&entry, &output_dir.join(relative)) {
                Ok(()) => summary.extracted += 1,
                Err(e) => summary.skip(entry.path, e),
            }
        }

        summary
    }
}

#[cfg(feature = "parallel")]
impl FstArchive<BufReader<File>> {
    /// Extract every entry using a rayon thread pool
    ///
    /// Each worker opens its own handle on the archive file, so this needs an
    /// archive created with [`FstArchive::open`].
    pub fn extract_all_parallel<F>(&self, output_dir: &Path, progress: F) -> Result<ExtractSummary>
    where
        F: Fn(&ExtractProgress) + Send + Sync,
    {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let source = self.source_path.as_deref().ok_or_else(|| {
            ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "parallel extraction needs a file-backed archive",
            ))
        })?;
        let total = self.entries.len();
        let processed = AtomicUsize::new(0);

        let summary = self
            .entries
            .par_iter()
            .map_init(
                || File::open(source).map(BufReader::new),
                |handle, entry| {
                    let mut summary = ExtractSummary::default();
                    let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress(&ExtractProgress::new(current, total, entry.path.as_str()));

                    let reader = match handle {
                        Ok(reader) => reader,
                        Err(e) => {
                            summary.skip(entry.path.clone(), e.to_string());
                            return summary;
                        }
                    };
                    let Some(relative) = safe_relative_path(&entry.path) else {
                        summary.skip(entry.path.clone(), "unsafe output path");
                        return summary;
                    };

                    let result = read_stored(reader, self.source_len, entry, &self.options)
                        .and_then(|raw| unpack(entry, raw))
                        .and_then(|data| write_output(&output_dir.join(relative), &data));
                    match result {
                        Ok(()) => summary.extracted += 1,
                        Err(e) => summary.skip(entry.path.clone(), e),
                    }
                    summary
                },
            )
            .reduce(ExtractSummary::default, |mut a, b| {
                a.merge(b);
                a
            });

        Ok(summary)
    }
}

/// Read the stored bytes of `entry`, failing on any short read
fn read_stored<R: Read + Seek>(
    reader: &mut R,
    source_len: u64,
    entry: &FstEntry,
    options: &ArchiveOptions,
) -> Result<Vec<u8>> {
    if entry.uncompressed_size > options.max_unpacked_size {
        return Err(ArchiveError::SizeLimitExceeded {
            declared: u64::from(entry.uncompressed_size),
            limit: u64::from(options.max_unpacked_size),
        });
    }

    let size = entry.stored_size();
    let end = u64::from(entry.data_offset) + u64::from(size);
    if end > source_len {
        return Err(ArchiveError::TruncatedArchive {
            needed: end,
            available: source_len,
        });
    }

    let mut raw = vec![0u8; size as usize];
    reader.seek(SeekFrom::Start(u64::from(entry.data_offset)))?;
    reader.read_exact(&mut raw)?;
    Ok(raw)
}

/// Decompress stored bytes if the entry is compressed
fn unpack(entry: &FstEntry, raw: Vec<u8>) -> Result<Vec<u8>> {
    if !entry.is_compressed() {
        return Ok(raw);
    }

    let expected = entry.uncompressed_size as usize;
    let data = codec::decompress(&raw, expected, CompressionScheme::Lzw);
    if data.is_empty() {
        return Err(ArchiveError::DecompressionFailed { expected });
    }
    if data.len() < expected {
        warn!(
            "{}: decompressed {} of {} bytes",
            entry.path,
            data.len(),
            expected
        );
    }
    Ok(data)
}
