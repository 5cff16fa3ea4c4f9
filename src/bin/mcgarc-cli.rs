//! mcgarc-cli - Command-line interface for MechCommander Gold archives
//!
//! Lists, extracts and inspects FST archives and PAK containers.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mcgarc::{
    is_pak_magic, ExtractProgress, ExtractSummary, FstArchive, PakContainer, ShapePack,
};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::filter::LevelFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "mcgarc-cli")]
#[command(about = "A CLI tool for MechCommander Gold FST and PAK archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the contents of an FST archive or PAK container
    List {
        /// Archive to list
        archive: PathBuf,
    },

    /// Extract every file or packet
    Extract {
        /// Archive to extract
        archive: PathBuf,

        /// Output directory
        output: PathBuf,

        /// Extract FST entries on all cores
        #[arg(short, long)]
        parallel: bool,

        /// File name prefix for PAK packets
        #[arg(long, default_value = "packet_")]
        prefix: String,
    },

    /// Show the packet tree of a PAK container, including nested containers
    Inspect {
        /// PAK container to inspect
        pak: PathBuf,

        /// Maximum nesting depth to descend
        #[arg(short, long, default_value_t = 8)]
        depth: usize,
    },

    /// List the shape strips stored in a PAK container
    Shapes {
        /// PAK container holding shape strips
        pak: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Fst,
    Pak,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::ERROR
    } else if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::List { archive } => list_archive(&archive, cli.verbose),
        Commands::Extract {
            archive,
            output,
            parallel,
            prefix,
        } => extract_archive(&archive, &output, parallel, &prefix, cli.quiet).map(|_| ()),
        Commands::Inspect { pak, depth } => inspect_pak(&pak, depth),
        Commands::Shapes { pak } => show_shapes(&pak, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// PAK magic wins; otherwise the extension decides, defaulting to FST
fn detect_kind(path: &Path) -> CliResult<ArchiveKind> {
    if !path.exists() {
        return Err(format!("Input file '{}' does not exist", path.display()).into());
    }

    let mut header = Vec::with_capacity(8);
    File::open(path)?.take(8).read_to_end(&mut header)?;
    if is_pak_magic(&header) {
        return Ok(ArchiveKind::Pak);
    }

    let is_pak_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pak"));
    Ok(if is_pak_ext {
        ArchiveKind::Pak
    } else {
        ArchiveKind::Fst
    })
}

fn list_archive(path: &Path, verbose: bool) -> CliResult<()> {
    match detect_kind(path)? {
        ArchiveKind::Fst => {
            let archive = FstArchive::open(path)?;
            println!("FST archive: {} ({} entries)", path.display(), archive.len());
            for entry in archive.entries() {
                if verbose {
                    println!(
                        "  {:>10} {:>10} @0x{:08X}  {}",
                        entry.uncompressed_size,
                        entry.stored_size(),
                        entry.data_offset,
                        entry.path
                    );
                } else {
                    println!("  {:>10}  {}", entry.uncompressed_size, entry.path);
                }
            }
        }
        ArchiveKind::Pak => {
            let pak = PakContainer::open(path)?;
            println!(
                "PAK container: {} ({} packets)",
                path.display(),
                pak.packet_count()
            );
            if !pak.has_magic() {
                println!("  Warning: header magic does not match");
            }
            for entry in pak.entries() {
                println!(
                    "  [{:5}] {:<8} @0x{:08X} packed {:>9} unpacked {:>9}",
                    entry.index,
                    entry.storage_type.label(),
                    entry.offset,
                    entry.packed_size,
                    entry.unpacked_size
                );
            }
        }
    }
    Ok(())
}

fn progress_bar(total: usize, quiet: bool) -> CliResult<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn extract_archive(
    path: &Path,
    output: &Path,
    parallel: bool,
    prefix: &str,
    quiet: bool,
) -> CliResult<ExtractSummary> {
    let start_time = Instant::now();

    let summary = match detect_kind(path)? {
        ArchiveKind::Fst => {
            let mut archive = FstArchive::open(path)?;
            let pb = progress_bar(archive.len(), quiet)?;
            let report = |p: &ExtractProgress| {
                pb.inc(1);
                pb.set_message(p.name.clone());
            };
            let summary = if parallel {
                extract_fst_parallel(&archive, output, report)?
            } else {
                archive.extract_all(output, report)
            };
            pb.finish_with_message("done");
            summary
        }
        ArchiveKind::Pak => {
            let mut pak = PakContainer::open(path)?;
            let pb = progress_bar(pak.packet_count(), quiet)?;
            let summary = pak.extract_all(output, prefix, |p| {
                pb.inc(1);
                pb.set_message(p.name.clone());
            })?;
            pb.finish_with_message("done");
            summary
        }
    };

    if !quiet {
        println!("✓ Extraction finished");
        println!("  Extracted: {}", summary.extracted);
        println!("  Skipped:   {}", summary.skipped);
        println!("  Time:      {:.2?}", start_time.elapsed());
        for (name, reason) in &summary.failures {
            println!("    {name}: {reason}");
        }
    }

    Ok(summary)
}

#[cfg(feature = "parallel")]
fn extract_fst_parallel<F>(archive: &FstArchive, output: &Path, report: F) -> CliResult<ExtractSummary>
where
    F: Fn(&ExtractProgress) + Send + Sync,
{
    Ok(archive.extract_all_parallel(output, report)?)
}

#[cfg(not(feature = "parallel"))]
fn extract_fst_parallel<F>(_archive: &FstArchive, _output: &Path, _report: F) -> CliResult<ExtractSummary>
where
    F: Fn(&ExtractProgress) + Send + Sync,
{
    Err("parallel extraction needs the `parallel` feature".into())
}

fn inspect_pak(path: &Path, depth: usize) -> CliResult<()> {
    let mut pak = PakContainer::open(path)?;
    println!(
        "PAK container: {} ({} packets, {} bytes)",
        path.display(),
        pak.packet_count(),
        pak.source_len()
    );

    let mut nested = 0;
    for packet in pak.walk(depth)? {
        let indent = "  ".repeat(packet.depth() + 1);
        let kind = match packet.nested_count {
            Some(count) => {
                nested += 1;
                format!("PAK with {count} packets")
            }
            None => packet.entry.storage_type.label().to_string(),
        };
        println!(
            "{indent}[{}] {kind}, packed {} unpacked {}",
            packet.path_string(),
            packet.entry.packed_size,
            packet.entry.unpacked_size
        );
    }
    println!("Nested containers: {nested}");
    Ok(())
}

fn show_shapes(path: &Path, verbose: bool) -> CliResult<()> {
    let mut pak = PakContainer::open(path)?;
    let shapes = ShapePack::from_container(&mut pak)?;
    println!(
        "{} shape strips, {} frames",
        shapes.table_count(),
        shapes.total_frame_count()
    );

    for (index, strip) in shapes.tables().iter().enumerate() {
        println!(
            "  Strip {index}: version {:?}, {} frames",
            strip.version(),
            strip.frame_count()
        );
        if !verbose {
            continue;
        }
        for (frame_index, frame) in strip.frames().enumerate() {
            match frame {
                Ok(frame) => println!(
                    "    Frame {frame_index}: {}x{} hotspot ({}, {})",
                    frame.width, frame.height, frame.hotspot_x, frame.hotspot_y
                ),
                Err(e) => println!("    Frame {frame_index}: {e}"),
            }
        }
    }
    Ok(())
}
