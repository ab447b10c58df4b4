mod functions;
mod strings;
mod vector;

pub use functions::{Prologue, classify_prologue, find_function_starts};
pub use strings::{DEFAULT_MIN_STRING_LEN, StringMatch, Strings, scan_strings};
pub use vector::{CORE_EXCEPTIONS, ResetVector, THUMB_BIT, VectorEntry, read_core_vectors};

use crate::decode::{DecodedInstruction, InstructionDecoder};
use crate::{Segment, SegmentBuffer};

/// Everything derived from one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentAnalysis {
    pub segment: Segment,
    pub buffer: SegmentBuffer,
    pub strings: Vec<StringMatch>,
    pub functions: Vec<u32>,
    /// `None` when no decoder was available or decoding failed.
    pub instructions: Option<Vec<DecodedInstruction>>,
    /// Binary file the segment was reloaded from, if any.
    pub binary: Option<String>,
}

/// Scan one segment for strings and, given a decoder, instructions and
/// function starts. Decoder failures degrade to an empty candidate list.
pub fn analyze_segment(
    segment: Segment,
    buffer: SegmentBuffer,
    decoder: Option<&dyn InstructionDecoder>,
    min_string_len: usize,
) -> SegmentAnalysis {
    let strings: Vec<StringMatch> =
        scan_strings(&buffer.data, buffer.start_address, min_string_len).collect();

    let instructions = decoder.and_then(|decoder| {
        match decoder.decode(&buffer.data, buffer.start_address) {
            Ok(instructions) => Some(instructions),
            Err(e) => {
                log::warn!("{}: {e}", segment.label());
                None
            }
        }
    });
    let functions = instructions
        .as_deref()
        .map(find_function_starts)
        .unwrap_or_default();

    log::debug!(
        "{}: {} string(s), {} instruction(s), {} function candidate(s)",
        segment.label(),
        strings.len(),
        instructions.as_ref().map_or(0, Vec::len),
        functions.len()
    );

    SegmentAnalysis {
        segment,
        buffer,
        strings,
        functions,
        instructions,
        binary: None,
    }
}
