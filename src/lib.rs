pub mod address_space;
pub mod analysis;
pub mod builder;
pub mod config;
pub mod decode;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod range;
pub mod report;
pub mod segment;

pub use address_space::AddressSpace;
pub use analysis::{
    ResetVector, SegmentAnalysis, StringMatch, VectorEntry, analyze_segment, find_function_starts,
    read_core_vectors, scan_strings,
};
pub use builder::{BuildOutput, StartAddress, build_segments};
pub use config::{AnalysisConfig, ConfigError};
pub use decode::{DecodeError, DecodedInstruction, InstructionDecoder, default_decoder};
pub use error::Error;
pub use io::{
    ExportError, FilterStats, HexRecord, LoadedSegment, OutputLayout, ParseError, RecordFilter,
    RecordType, filter_records, load_segment, read_lines, write_segment,
};
pub use pipeline::{Analysis, Extraction, analyze, analyze_loaded, extract};
pub use range::{Range, RangeError};
pub use report::ReportWriter;
pub use segment::{Segment, SegmentBuffer};
