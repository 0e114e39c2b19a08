use log::warn;

use crate::format::{IndexRecord, INDEX_RECORD_SIZE};

/// Parsed contents of an index file.
#[derive(Debug, Clone, Default)]
pub struct IndexFile {
    /// Complete records, in file order.
    pub records: Vec<IndexRecord>,
    /// Total size of the index file in bytes.
    pub size: u64,
    /// True when the file ended mid-record. The partial record is dropped;
    /// everything before it is kept.
    pub truncated: bool,
}

/// Parse an index file into its fixed-size records.
///
/// Consumes 40-byte records from the front of `bytes` until the input is
/// exhausted. A trailing partial record is a recoverable condition: parsing
/// stops, all prior records are returned, and the truncation is reported via
/// [`IndexFile::truncated`] plus a warning diagnostic. This never fails.
pub fn read_index(bytes: &[u8]) -> IndexFile {
    let mut chunks = bytes.chunks_exact(INDEX_RECORD_SIZE);
    let mut records = Vec::with_capacity(bytes.len() / INDEX_RECORD_SIZE);

    for chunk in &mut chunks {
        let mut buf = [0u8; INDEX_RECORD_SIZE];
        buf.copy_from_slice(chunk);
        records.push(IndexRecord::from_bytes(&buf));
    }

    let truncated = !chunks.remainder().is_empty();
    if truncated {
        warn!(
            "index truncated: {} trailing bytes after record {} do not fill a {}-byte record",
            chunks.remainder().len(),
            records.len(),
            INDEX_RECORD_SIZE
        );
    }

    IndexFile {
        records,
        size: bytes.len() as u64,
        truncated,
    }
}
