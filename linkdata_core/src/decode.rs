use std::io::Read;

use flate2::read::ZlibDecoder;
use log::warn;
use thiserror::Error;

use crate::format::{BlockSubHeader, FIELD_ALIGNMENT, SUBHEADER_SIZE};

/// Hard per-block decode failures. Any of these discards the whole block —
/// the decoder never emits a partial buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The block is too short for its sub-header, or a field's declared
    /// layout runs past the end of the block.
    #[error("block {block}: malformed layout ({detail})")]
    MalformedHeader { block: u64, detail: String },

    /// The declared field count (sub-header slot 1) exceeds the number of
    /// non-zero candidate size slots.
    #[error("block {block}: declared field count {declared} exceeds {available} non-zero size slots")]
    FieldCountOverflow {
        block: u64,
        declared: u32,
        available: usize,
    },

    /// A field's zlib stream is corrupt.
    #[error("block {block}: field {field} failed to inflate: {source}")]
    DecompressionFailed {
        block: u64,
        field: usize,
        source: std::io::Error,
    },
}

/// Decode one deflate-compressed block into its original payload bytes.
///
/// Layout: a 128-byte sub-header, then one field per non-zero candidate size
/// (sub-header slots 3..32, in order). Each field is a 4-byte advisory inner
/// size followed by a self-contained zlib stream, and each field's end is
/// rounded up to the next 128-byte boundary before the next field starts.
/// The advisory inner size is expected to equal `field_size − 4`; a mismatch
/// is a warning only, and `field_size − 4` is authoritative.
///
/// On success returns the concatenation of all inflated fields, in field
/// order, with no separators. `block_id` is used only for diagnostics.
pub fn decode_block(block: &[u8], block_id: u64) -> Result<Vec<u8>, DecodeError> {
    let header_buf: &[u8; SUBHEADER_SIZE] = block
        .get(..SUBHEADER_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| DecodeError::MalformedHeader {
            block: block_id,
            detail: format!(
                "{} bytes is too short for the {}-byte sub-header",
                block.len(),
                SUBHEADER_SIZE
            ),
        })?;
    let header = BlockSubHeader::from_bytes(header_buf);

    let field_sizes = header.field_sizes();
    let declared = header.declared_field_count();
    if declared as usize > field_sizes.len() {
        return Err(DecodeError::FieldCountOverflow {
            block: block_id,
            declared,
            available: field_sizes.len(),
        });
    }

    let mut cursor = SUBHEADER_SIZE;
    let mut out = Vec::new();

    for (field, &size) in field_sizes.iter().enumerate() {
        let size = size as usize;
        let end = cursor.saturating_add(size).min(block.len());
        let payload = block.get(cursor..end).unwrap_or(&[]);

        // Each field needs at least its 4-byte inner size prefix.
        let (inner_bytes, compressed) =
            payload
                .split_first_chunk::<4>()
                .ok_or_else(|| DecodeError::MalformedHeader {
                    block: block_id,
                    detail: format!(
                        "field {} ({} bytes at offset {}) runs past the block end",
                        field, size, cursor
                    ),
                })?;

        // Advisory only — field_size − 4 stays authoritative on mismatch.
        let inner_size = u32::from_le_bytes(*inner_bytes);
        if inner_size as usize != size - 4 {
            warn!(
                "block {}: field {} inner size {} disagrees with outer size {} - 4",
                block_id, field, inner_size, size
            );
        }

        let mut decoder = ZlibDecoder::new(compressed);
        decoder
            .read_to_end(&mut out)
            .map_err(|source| DecodeError::DecompressionFailed {
                block: block_id,
                field,
                source,
            })?;

        // Round the post-field position up to the next alignment boundary.
        cursor = (cursor + size + FIELD_ALIGNMENT - 1) / FIELD_ALIGNMENT * FIELD_ALIGNMENT;
    }

    Ok(out)
}
