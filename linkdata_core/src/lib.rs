pub mod decode;
pub mod extract;
pub mod format;
pub mod index;

pub use decode::{decode_block, DecodeError};
pub use extract::{extract, BlockSink, DirSink, ExtractStats};
pub use format::{BlockSubHeader, CompressionMethod, IndexRecord, FIELD_ALIGNMENT, INDEX_RECORD_SIZE, SUBHEADER_SIZE};
pub use index::{read_index, IndexFile};
