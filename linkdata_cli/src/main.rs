use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use linkdata_core::{extract, read_index, CompressionMethod, DirSink, IndexFile};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "linkdata",
    about = "Extract and inspect two-file index/data block containers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every block into one numbered file per block
    Extract {
        /// Path to the index file (fixed 40-byte records)
        index: PathBuf,
        /// Path to the data file the index points into
        data: PathBuf,
        /// Output directory, created if absent
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },
    /// Print index statistics without touching the data file
    Inspect {
        /// Path to the index file
        index: PathBuf,
        /// Print per-record details, including the opaque trailing tags
        #[arg(long)]
        records: bool,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn load_index(path: &PathBuf) -> anyhow::Result<IndexFile> {
    let bytes = std::fs::read(path).with_context(|| format!("opening index file {:?}", path))?;
    Ok(read_index(&bytes))
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_extract(index_path: PathBuf, data_path: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let index = load_index(&index_path)?;

    let mut data = File::open(&data_path)
        .with_context(|| format!("opening data file {:?}", data_path))?;
    let mut sink = DirSink::create(&output, index.records.len())?;

    let t0 = Instant::now();
    let stats = extract(&index.records, &mut data, &mut sink)?;
    let elapsed = t0.elapsed();

    eprintln!("  records     : {}", index.records.len());
    eprintln!("  written     : {}", stats.written);
    eprintln!("  skipped     : {}", stats.skipped);
    eprintln!("  payload     : {}", human_bytes(stats.payload_bytes));
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_inspect(index_path: PathBuf, show_records: bool) -> anyhow::Result<()> {
    let index = load_index(&index_path)?;

    let compressed_total: u64 = index.records.iter().map(|r| r.compressed_size).sum();
    let uncompressed_total: u64 = index.records.iter().map(|r| r.uncompressed_size).sum();
    let deflate_count = index
        .records
        .iter()
        .filter(|r| r.method() == CompressionMethod::Deflate)
        .count();

    println!("=== Index file: {:?} ===", index_path);
    println!();
    println!("  index size     : {}", human_bytes(index.size));
    println!("  records        : {}", index.records.len());
    println!("  truncated      : {}", if index.truncated { "yes" } else { "no" });
    println!("  deflate blocks : {}", deflate_count);
    println!("  stored blocks  : {}", index.records.len() - deflate_count);
    println!("  compressed     : {}", human_bytes(compressed_total));
    println!("  uncompressed   : {}", human_bytes(uncompressed_total));

    if show_records {
        println!();
        println!(
            "  {:>8}  {:>14}  {:>12}  {:>12}  {:>7}  {:>17}",
            "block", "offset", "compressed", "uncompressed", "method", "tags"
        );
        println!("  {}", "-".repeat(80));
        for (i, r) in index.records.iter().enumerate() {
            println!(
                "  {:>8}  {:>14}  {:>12}  {:>12}  {:>7}  {} {}",
                i + 1,
                r.offset,
                human_bytes(r.compressed_size),
                human_bytes(r.uncompressed_size),
                r.method_raw & 0xff,
                hex4(&r.tag_a),
                hex4(&r.tag_b),
            );
        }
    }

    Ok(())
}

fn hex4(tag: &[u8; 4]) -> String {
    tag.iter().map(|b| format!("{:02x}", b)).collect()
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract {
            index,
            data,
            output,
        } => run_extract(index, data, output),
        Commands::Inspect { index, records } => run_inspect(index, records),
    }
}
