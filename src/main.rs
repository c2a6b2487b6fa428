use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rlbwt_merge::bwt::{
    build, symbol_from_dna_ascii, BuildConfig, GapBackend, NaiveSuffixArrayBuilder, RlBwt,
    DEFAULT_ASIZE, DEFAULT_SBITS,
};
use rlbwt_merge::logging::{init_subscriber, Verbosity};

#[derive(Parser, Debug)]
#[command(name = "rlbwt", about = "RL-BWT index construction and merge core")]
struct Cli {
    /// Repeat for more progress output (-vvv enables the 10M-symbol
    /// progress tick during gap computation and merge).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a fresh RL-BWT index from a raw sequence file.
    Build {
        /// FASTA-ish sequence file (lines starting with '>' ignored).
        input: PathBuf,
        /// Output index file.
        output: PathBuf,
    },
    /// Append a new batch of sequence onto an existing index.
    Append {
        /// Existing index file, as produced by `build`.
        index: PathBuf,
        /// FASTA-ish sequence file with the new batch.
        input: PathBuf,
        /// Output index file.
        output: PathBuf,
        /// Force the sparse gap backend instead of the dense default.
        #[arg(long)]
        sparse: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_occurrences(cli.verbose);
    init_subscriber(verbosity);

    match cli.command {
        Commands::Build { input, output } => run_build(input, output, verbosity)?,
        Commands::Append {
            index,
            input,
            output,
            sparse,
        } => run_append(index, input, output, sparse, verbosity)?,
    }

    Ok(())
}

fn run_build(input: PathBuf, output: PathBuf, verbosity: Verbosity) -> Result<()> {
    let mut symbols = read_sequence_file(&input)
        .with_context(|| format!("failed to read sequence from {}", input.display()))?;

    let cfg = BuildConfig {
        asize: DEFAULT_ASIZE,
        sbits: DEFAULT_SBITS,
        gap_backend: GapBackend::Dense,
        verbosity,
        ..Default::default()
    };
    let index = build(None, &NaiveSuffixArrayBuilder, &mut symbols, &cfg)
        .context("failed to build RL-BWT index")?;

    write_index_file(&output, &index)
        .with_context(|| format!("failed to write index to {}", output.display()))?;

    println!(
        "built index: {} symbols, {} sentinels",
        index.mcnt(0),
        index.mcnt(1)
    );
    Ok(())
}

fn run_append(
    index_path: PathBuf,
    input: PathBuf,
    output: PathBuf,
    sparse: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let existing = read_index_file(&index_path)
        .with_context(|| format!("failed to read index from {}", index_path.display()))?;
    let mut symbols = read_sequence_file(&input)
        .with_context(|| format!("failed to read sequence from {}", input.display()))?;

    let cfg = BuildConfig {
        asize: existing.asize(),
        sbits: existing.sbits(),
        gap_backend: if sparse { GapBackend::Sparse } else { GapBackend::Auto },
        verbosity,
        ..Default::default()
    };
    let merged = build(Some(&existing), &NaiveSuffixArrayBuilder, &mut symbols, &cfg)
        .context("failed to append batch to RL-BWT index")?;

    write_index_file(&output, &merged)
        .with_context(|| format!("failed to write index to {}", output.display()))?;

    println!(
        "appended batch: {} -> {} symbols",
        existing.mcnt(0),
        merged.mcnt(0)
    );
    Ok(())
}

/// Read a plain-text or FASTA-ish sequence file into symbol codes,
/// appending a sentinel after every line (one string per line).
fn read_sequence_file(path: &PathBuf) -> Result<Vec<u8>> {
    let contents = std::fs::read_to_string(path)?;
    let mut symbols = Vec::new();
    for line in contents.lines() {
        if line.starts_with('>') || line.trim().is_empty() {
            continue;
        }
        for byte in line.trim().bytes() {
            let sym = symbol_from_dna_ascii(byte)
                .ok_or_else(|| anyhow::anyhow!("unrecognized base '{}'", byte as char))?;
            symbols.push(sym);
        }
        symbols.push(rlbwt_merge::bwt::SENTINEL);
    }
    Ok(symbols)
}

/// Minimal on-disk form for the CLI's own round-tripping: a header
/// line of `asize sbits` followed by one `len sym` line per decoded
/// run. The packed bitstream layout of spec.md §6 is an in-memory
/// format; this text form is the CLI's own persistence shim around it
/// and is not meant to be byte-compatible with it.
fn write_index_file(path: &PathBuf, index: &RlBwt) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{} {}", index.asize(), index.sbits())?;
    let mut cursor = index.begin_decoding();
    while let Some((len, sym)) = index.dec(&mut cursor) {
        writeln!(file, "{len} {sym}")?;
    }
    Ok(())
}

fn read_index_file(path: &PathBuf) -> Result<RlBwt> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    let mut lines = contents.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("empty index file"))?;
    let mut parts = header.split_whitespace();
    let asize: u8 = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing asize in index header"))?
        .parse()?;
    let sbits: u8 = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing sbits in index header"))?
        .parse()?;

    let mut index = RlBwt::init(asize, sbits)?;
    let mut itr = index.begin_encoding()?;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let len: u64 = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("malformed run line"))?
            .parse()?;
        let sym: u8 = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("malformed run line"))?
            .parse()?;
        index.enc(&mut itr, len, sym);
    }
    index.enc_finish(itr)?;
    Ok(index)
}
