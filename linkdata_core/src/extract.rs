use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, warn};

use crate::decode::decode_block;
use crate::format::{CompressionMethod, IndexRecord};

/// Receives one finished payload per successfully processed block.
///
/// Block ids are 1-based and sequential in index order; skipped blocks leave
/// gaps. Implementations decide how a payload is persisted.
pub trait BlockSink {
    fn write_block(&mut self, block_id: u64, data: &[u8]) -> anyhow::Result<()>;
}

/// Outcome counters for one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Blocks handed to the sink.
    pub written: u64,
    /// Blocks skipped due to a non-fatal per-block condition.
    pub skipped: u64,
    /// Total payload bytes handed to the sink.
    pub payload_bytes: u64,
}

/// Run the full pipeline: for each index record, read its byte range from the
/// data file, decode it if deflate-compressed, and hand the result to `sink`.
///
/// Per-block conditions never abort the run:
/// - a range reaching past the end of the data file skips that block;
/// - any decode failure skips that block, with nothing written for it.
///
/// Blocks are processed strictly in index order with 1-based ids. Stored
/// blocks (and any unrecognized method byte) pass through untouched. I/O
/// errors on `data` or the sink are fatal and propagate.
pub fn extract<R, S>(records: &[IndexRecord], data: &mut R, sink: &mut S) -> anyhow::Result<ExtractStats>
where
    R: Read + Seek,
    S: BlockSink,
{
    let data_len = data.seek(SeekFrom::End(0)).context("sizing data file")?;
    let mut stats = ExtractStats::default();

    for (idx, record) in records.iter().enumerate() {
        let block_id = idx as u64 + 1;

        let in_range = record
            .offset
            .checked_add(record.compressed_size)
            .is_some_and(|end| end <= data_len);
        if !in_range {
            warn!(
                "block {}: offset {} + compressed size {} exceeds data file size {}; skipping",
                block_id, record.offset, record.compressed_size, data_len
            );
            stats.skipped += 1;
            continue;
        }

        data.seek(SeekFrom::Start(record.offset))
            .with_context(|| format!("seeking to block {}", block_id))?;
        let mut block = vec![0u8; record.compressed_size as usize];
        data.read_exact(&mut block)
            .with_context(|| format!("reading block {}", block_id))?;

        let payload = match record.method() {
            CompressionMethod::Deflate => match decode_block(&block, block_id) {
                Ok(decoded) => {
                    if decoded.len() as u64 != record.uncompressed_size {
                        debug!(
                            "block {}: decoded {} bytes, index declares {}",
                            block_id,
                            decoded.len(),
                            record.uncompressed_size
                        );
                    }
                    decoded
                }
                Err(err) => {
                    warn!("skipping {}", err);
                    stats.skipped += 1;
                    continue;
                }
            },
            CompressionMethod::Stored => block,
        };

        sink.write_block(block_id, &payload)?;
        stats.written += 1;
        stats.payload_bytes += payload.len() as u64;
    }

    Ok(stats)
}

// ── Directory sink ─────────────────────────────────────────────────────────

/// Writes each block to `<dir>/<id>.bin`, with the id zero-padded so that
/// lexicographic and numeric ordering coincide.
pub struct DirSink {
    dir: PathBuf,
    pad_width: usize,
}

impl DirSink {
    /// Create the output directory (if absent) and fix the pad width from the
    /// total record count. Directory creation failure is fatal.
    pub fn create(dir: impl AsRef<Path>, record_count: usize) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {:?}", dir))?;
        Ok(Self {
            dir,
            pad_width: decimal_width(record_count),
        })
    }

    /// Zero-pad width used for filenames.
    pub fn pad_width(&self) -> usize {
        self.pad_width
    }

    /// Output path for a given block id.
    pub fn path_for(&self, block_id: u64) -> PathBuf {
        self.dir
            .join(format!("{:0width$}.bin", block_id, width = self.pad_width))
    }
}

impl BlockSink for DirSink {
    fn write_block(&mut self, block_id: u64, data: &[u8]) -> anyhow::Result<()> {
        let path = self.path_for(block_id);
        fs::write(&path, data).with_context(|| format!("writing block file {:?}", path))?;
        Ok(())
    }
}

/// Number of decimal digits in `n` (minimum 1).
fn decimal_width(n: usize) -> usize {
    let mut width = 1;
    let mut n = n / 10;
    while n > 0 {
        width += 1;
        n /= 10;
    }
    width
}
