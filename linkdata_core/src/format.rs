/// Fixed size of one index record in bytes.
///   offset:u64 + uncompressed_size:u64 + compressed_size:u64
///   + method:u32 + reserved[4] + tag_a[4] + tag_b[4]
///   = 8 + 8 + 8 + 4 + 4 + 4 + 4 = 40
pub const INDEX_RECORD_SIZE: usize = 40;

/// Number of u32 slots in a block sub-header.
pub const SUBHEADER_SLOTS: usize = 32;

/// Size of the block sub-header in bytes: 32 × u32 = 128.
pub const SUBHEADER_SIZE: usize = SUBHEADER_SLOTS * 4;

/// Each field's end position is rounded up to the next 128-byte boundary
/// before the next field starts.
pub const FIELD_ALIGNMENT: usize = 128;

/// Copy `N` bytes out of `buf` starting at `at`. Offsets are compile-time
/// layout constants, so the length invariant holds by construction.
fn array_at<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}

// ── Compression methods ────────────────────────────────────────────────────

pub const METHOD_STORED: u8 = 0;
pub const METHOD_DEFLATE: u8 = 1;

/// How a block's bytes are stored in the data file.
///
/// Only the low byte of the on-disk method word is significant; the upper
/// three bytes are reserved. Any low byte other than 1 is treated as stored
/// and passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
}

// ── Index record ───────────────────────────────────────────────────────────

/// One 40-byte record in the index file — locates and describes a single
/// block inside the data file.
///
/// `reserved`, `tag_a`, and `tag_b` have unknown semantics. They are carried
/// verbatim for inspection and forward compatibility, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRecord {
    /// Byte offset of this block from the start of the data file.
    pub offset: u64,
    /// Expected size after decompression. Informational only — decoded
    /// output is not required to match it.
    pub uncompressed_size: u64,
    /// Exact byte length to read from the data file at `offset`.
    pub compressed_size: u64,
    /// On-disk method word; only the low byte is significant.
    pub method_raw: u32,
    /// Reserved bytes following the method word. Opaque.
    pub reserved: [u8; 4],
    /// Opaque trailing tag.
    pub tag_a: [u8; 4],
    /// Opaque trailing tag.
    pub tag_b: [u8; 4],
}

impl IndexRecord {
    /// Serialize to exactly `INDEX_RECORD_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; INDEX_RECORD_SIZE] {
        let mut buf = [0u8; INDEX_RECORD_SIZE];
        buf[0..8].copy_from_slice(&self.offset.to_le_bytes());
        buf[8..16].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        buf[16..24].copy_from_slice(&self.compressed_size.to_le_bytes());
        buf[24..28].copy_from_slice(&self.method_raw.to_le_bytes());
        buf[28..32].copy_from_slice(&self.reserved);
        buf[32..36].copy_from_slice(&self.tag_a);
        buf[36..40].copy_from_slice(&self.tag_b);
        buf
    }

    /// Deserialize from `INDEX_RECORD_SIZE` bytes. All fields little-endian.
    pub fn from_bytes(buf: &[u8; INDEX_RECORD_SIZE]) -> Self {
        Self {
            offset: u64::from_le_bytes(array_at(buf, 0)),
            uncompressed_size: u64::from_le_bytes(array_at(buf, 8)),
            compressed_size: u64::from_le_bytes(array_at(buf, 16)),
            method_raw: u32::from_le_bytes(array_at(buf, 24)),
            reserved: array_at(buf, 28),
            tag_a: array_at(buf, 32),
            tag_b: array_at(buf, 36),
        }
    }

    /// Effective compression method: low byte 1 means deflate, anything else
    /// is stored.
    pub fn method(&self) -> CompressionMethod {
        match (self.method_raw & 0xff) as u8 {
            METHOD_DEFLATE => CompressionMethod::Deflate,
            _ => CompressionMethod::Stored,
        }
    }
}

// ── Block sub-header ───────────────────────────────────────────────────────

/// The fixed 32-slot sub-header prefixed to every block.
///
/// Slot 1 is the declared field count. Slots 3..32 are candidate field sizes,
/// where 0 means "slot unused". Slots 0 and 2 have unknown semantics and are
/// kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSubHeader {
    pub slots: [u32; SUBHEADER_SLOTS],
}

impl BlockSubHeader {
    /// Serialize to exactly `SUBHEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; SUBHEADER_SIZE] {
        let mut buf = [0u8; SUBHEADER_SIZE];
        for (i, slot) in self.slots.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&slot.to_le_bytes());
        }
        buf
    }

    /// Deserialize from `SUBHEADER_SIZE` bytes.
    pub fn from_bytes(buf: &[u8; SUBHEADER_SIZE]) -> Self {
        let mut slots = [0u32; SUBHEADER_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = u32::from_le_bytes(array_at(buf, i * 4));
        }
        Self { slots }
    }

    /// Declared field count (slot 1), validated against the effective field
    /// list during decoding.
    pub fn declared_field_count(&self) -> u32 {
        self.slots[1]
    }

    /// The effective field list: non-zero candidate sizes among slots 3..32,
    /// in original order. Computed once per block.
    pub fn field_sizes(&self) -> Vec<u32> {
        self.slots[3..].iter().copied().filter(|&s| s > 0).collect()
    }
}
