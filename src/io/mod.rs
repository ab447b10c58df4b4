mod binary;
mod error;
mod intel_hex;
mod layout;

pub(crate) use binary::write_file;
pub use binary::{
    ExportedSegment, LoadedSegment, SegmentSidecar, export_segment, load_segment, write_segment,
};
pub use error::{ExportError, ParseError};
pub use intel_hex::{
    DropReason, FilterStats, HexRecord, MIN_RECORD_LEN, RecordFilter, RecordType, filter_records,
    read_lines, write_records,
};
pub use layout::OutputLayout;
