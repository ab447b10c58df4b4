//! End-to-end flow: read -> filter -> build -> analyze -> write.
//!
//! Each stage fully consumes its input before the next starts. Output files
//! are written one at a time; a failure stops the run but keeps whatever was
//! already written.

use std::path::{Path, PathBuf};

use crate::analysis::{
    ResetVector, SegmentAnalysis, VectorEntry, analyze_segment, read_core_vectors,
};
use crate::builder::{StartAddress, build_segments};
use crate::config::AnalysisConfig;
use crate::decode::InstructionDecoder;
use crate::io::{
    FilterStats, HexRecord, LoadedSegment, OutputLayout, filter_records, load_segment,
    read_lines, write_file, write_records, write_segment,
};
use crate::report::ReportWriter;
use crate::{Error, Segment, SegmentBuffer};

/// Read the input file, distinguishing a missing file from other failures.
pub fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::InputNotFound(path.to_path_buf())
        } else {
            Error::UnreadableInput {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Filtered records and the segments rebuilt from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<HexRecord>,
    pub stats: FilterStats,
    pub segments: Vec<(Segment, SegmentBuffer)>,
    pub start_address: Option<StartAddress>,
}

/// Filter the raw HEX text and rebuild its segments.
///
/// Fails with [`Error::NoSegments`] when nothing survives filtering.
pub fn extract(input: &[u8]) -> Result<Extraction, Error> {
    let mut filter = filter_records(read_lines(input));
    let records: Vec<HexRecord> = filter.by_ref().collect();
    let stats = filter.stats();
    log::debug!("record filter: {stats}");

    let build = build_segments(&records)?;
    if build.segments.is_empty() {
        return Err(Error::NoSegments);
    }

    Ok(Extraction {
        records,
        stats,
        segments: build.segments,
        start_address: build.start_address,
    })
}

/// Reload exported segments from their sidecars.
pub fn load_segments<P: AsRef<Path>>(sidecars: &[P]) -> Result<Vec<LoadedSegment>, Error> {
    sidecars
        .iter()
        .map(|path| load_segment(path.as_ref()).map_err(Error::from))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Ascending by start address.
    pub segments: Vec<SegmentAnalysis>,
    pub reset_vector: Option<ResetVector>,
    pub core_vectors: Vec<VectorEntry>,
    pub start_address: Option<StartAddress>,
}

impl Analysis {
    pub fn lowest(&self) -> Option<&SegmentAnalysis> {
        self.segments.first()
    }
}

/// Analyze every segment. The lowest segment is taken as the vector table.
pub fn analyze(
    segments: Vec<(Segment, SegmentBuffer)>,
    start_address: Option<StartAddress>,
    decoder: Option<&dyn InstructionDecoder>,
    config: &AnalysisConfig,
) -> Result<Analysis, Error> {
    let segments = segments
        .into_iter()
        .map(|(segment, buffer)| (segment, buffer, None))
        .collect();
    analyze_all(segments, start_address, decoder, config)
}

/// Analyze segments reloaded from sidecars. Reports name each segment by the
/// binary its sidecar points at.
pub fn analyze_loaded(
    loaded: Vec<LoadedSegment>,
    decoder: Option<&dyn InstructionDecoder>,
    config: &AnalysisConfig,
) -> Result<Analysis, Error> {
    let segments = loaded
        .into_iter()
        .map(|item| (item.segment, item.buffer, Some(item.binary)))
        .collect();
    analyze_all(segments, None, decoder, config)
}

fn analyze_all(
    mut segments: Vec<(Segment, SegmentBuffer, Option<String>)>,
    start_address: Option<StartAddress>,
    decoder: Option<&dyn InstructionDecoder>,
    config: &AnalysisConfig,
) -> Result<Analysis, Error> {
    if segments.is_empty() {
        return Err(Error::NoSegments);
    }
    segments.sort_by_key(|(segment, _, _)| segment.start_address());

    let segments: Vec<SegmentAnalysis> = segments
        .into_iter()
        .map(|(segment, buffer, binary)| SegmentAnalysis {
            binary,
            ..analyze_segment(segment, buffer, decoder, config.strings.min_length)
        })
        .collect();

    let (reset_vector, core_vectors) = match segments.first() {
        Some(lowest) => {
            let vector = ResetVector::read(&lowest.buffer);
            if vector.is_none() {
                log::info!(
                    "{} is only {} byte(s); no reset vector",
                    lowest.segment.label(),
                    lowest.buffer.len()
                );
            }
            (vector, read_core_vectors(&lowest.buffer))
        }
        None => (None, Vec::new()),
    };

    Ok(Analysis {
        segments,
        reset_vector,
        core_vectors,
        start_address,
    })
}

/// Files written for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOutputs {
    pub segment: Segment,
    pub binary: Option<PathBuf>,
    pub sidecar: Option<PathBuf>,
    pub listing: Option<PathBuf>,
}

/// Write binaries, sidecars, listings and the segment summary.
pub fn write_segments(
    layout: &OutputLayout,
    analysis: &Analysis,
    config: &AnalysisConfig,
) -> Result<(Vec<SegmentOutputs>, PathBuf), Error> {
    let writer = ReportWriter::new(layout);
    let mut outputs = Vec::with_capacity(analysis.segments.len());

    for item in &analysis.segments {
        let (binary, sidecar) = if config.output.write_binaries {
            let exported = write_segment(
                layout,
                &item.segment,
                &item.buffer,
                config.output.write_sidecars,
            )?;
            (Some(exported.binary), exported.sidecar)
        } else {
            (None, None)
        };

        let listing = match (&item.instructions, config.output.write_listings) {
            (Some(instructions), true) => {
                Some(writer.write_listing(&item.segment, &item.buffer, instructions)?)
            }
            _ => None,
        };

        outputs.push(SegmentOutputs {
            segment: item.segment,
            binary,
            sidecar,
            listing,
        });
    }

    let segments: Vec<Segment> = analysis.segments.iter().map(|item| item.segment).collect();
    let summary = writer.write_summary(&segments)?;
    Ok((outputs, summary))
}

/// Report files written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutputs {
    pub strings: PathBuf,
    pub functions: PathBuf,
    pub reset_vector: Option<PathBuf>,
    pub core_vectors: Option<PathBuf>,
}

/// Write the strings, functions, reset-vector and core-vector reports.
pub fn write_reports(layout: &OutputLayout, analysis: &Analysis) -> Result<ReportOutputs, Error> {
    let writer = ReportWriter::new(layout);
    let strings = writer.write_strings(&analysis.segments)?;
    let functions = writer.write_functions(&analysis.segments)?;
    let reset_vector = analysis
        .reset_vector
        .map(|vector| writer.write_reset_vector(&vector, analysis.start_address))
        .transpose()?;
    let core_vectors = if analysis.core_vectors.is_empty() {
        None
    } else {
        Some(writer.write_core_vectors(&analysis.core_vectors)?)
    };

    Ok(ReportOutputs {
        strings,
        functions,
        reset_vector,
        core_vectors,
    })
}

/// Write the records that survived filtering as a standard Intel HEX file.
pub fn write_filtered_hex(layout: &OutputLayout, records: &[HexRecord]) -> Result<PathBuf, Error> {
    let path = layout.filtered_hex_path();
    write_file(&path, &write_records(records))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeError, DecodedInstruction};

    struct Scripted;

    impl InstructionDecoder for Scripted {
        fn decode(&self, _: &[u8], base: u32) -> Result<Vec<DecodedInstruction>, DecodeError> {
            Ok(vec![
                DecodedInstruction::new(base, "push", "{r7, lr}"),
                DecodedInstruction::new(base + 2, "bx", "lr"),
            ])
        }
    }

    const VECTOR_HEX: &str = ":080000000010002001000008BF\n:00000001FF\n";

    #[test]
    fn test_extract_rejects_empty_result() {
        let result = extract(b":0400000A01020304E8\n:00000001FF\n");
        assert!(matches!(result, Err(Error::NoSegments)));
    }

    #[test]
    fn test_extract_reports_stats() {
        let extraction = extract(b"junk\n:0400000A01020304E8\n:0100000011EE\n").unwrap();
        assert_eq!(extraction.stats.kept, 1);
        assert_eq!(extraction.stats.dropped(), 2);
        assert_eq!(extraction.segments.len(), 1);
    }

    #[test]
    fn test_analyze_reads_reset_vector_from_lowest() {
        let extraction = extract(VECTOR_HEX.as_bytes()).unwrap();
        let analysis = analyze(
            extraction.segments,
            None,
            Some(&Scripted),
            &AnalysisConfig::default(),
        )
        .unwrap();
        let vector = analysis.reset_vector.unwrap();
        assert_eq!(vector.initial_stack_pointer, 0x2000_1000);
        assert_eq!(vector.reset_handler, 0x0800_0000);
        assert_eq!(analysis.core_vectors.len(), 2);
        assert_eq!(analysis.segments[0].functions, vec![0]);
    }

    #[test]
    fn test_analyze_sorts_unordered_segments() {
        let high = Segment::new(1, crate::Range::from_start_length(0x100, 1).unwrap());
        let low = Segment::new(0, crate::Range::from_start_length(0x0, 1).unwrap());
        let analysis = analyze(
            vec![
                (high, SegmentBuffer::new(0x100, vec![1])),
                (low, SegmentBuffer::new(0, vec![2])),
            ],
            None,
            None,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(analysis.lowest().unwrap().segment.start_address(), 0);
        assert!(analysis.reset_vector.is_none());
        assert!(analysis.core_vectors.is_empty());
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.hex");
        assert!(matches!(read_input(&missing), Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_write_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(&dir.path().join("fw"));
        let config = AnalysisConfig::default();

        let extraction = extract(VECTOR_HEX.as_bytes()).unwrap();
        let original = extraction.segments.clone();
        let analysis = analyze(extraction.segments, None, Some(&Scripted), &config).unwrap();
        let (outputs, summary) = write_segments(&layout, &analysis, &config).unwrap();

        assert!(summary.exists());
        assert!(outputs[0].listing.as_ref().unwrap().exists());
        let sidecars: Vec<PathBuf> = outputs.iter().filter_map(|o| o.sidecar.clone()).collect();
        let reloaded: Vec<(Segment, SegmentBuffer)> = load_segments(&sidecars)
            .unwrap()
            .into_iter()
            .map(|item| (item.segment, item.buffer))
            .collect();
        assert_eq!(reloaded, original);

        let reports = write_reports(&layout, &analysis).unwrap();
        let reset = std::fs::read_to_string(reports.reset_vector.unwrap()).unwrap();
        assert_eq!(reset, "Initial_SP = 0x20001000\nReset_Handler = 0x08000000\n");
    }

    #[test]
    fn test_reports_name_reloaded_binaries() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default();
        let extraction = extract(VECTOR_HEX.as_bytes()).unwrap();
        let analysis = analyze(extraction.segments, None, None, &config).unwrap();
        let (outputs, _) =
            write_segments(&OutputLayout::new(&dir.path().join("fw")), &analysis, &config)
                .unwrap();

        let sidecars: Vec<PathBuf> = outputs.iter().filter_map(|o| o.sidecar.clone()).collect();
        let reloaded = analyze_loaded(load_segments(&sidecars).unwrap(), None, &config).unwrap();
        assert_eq!(reloaded.segments[0].binary.as_deref(), Some("fw_seg00.bin"));

        let other = OutputLayout::new(&dir.path().join("other"));
        let reports = write_reports(&other, &reloaded).unwrap();
        let strings = std::fs::read_to_string(reports.strings).unwrap();
        assert_eq!(strings, "# fw_seg00.bin @ 0x00000000 (found 0 strings)\n\n");
    }

    #[test]
    fn test_listings_skipped_without_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(&dir.path().join("fw"));
        let config = AnalysisConfig::default();
        let extraction = extract(VECTOR_HEX.as_bytes()).unwrap();
        let analysis = analyze(extraction.segments, None, None, &config).unwrap();
        let (outputs, _) = write_segments(&layout, &analysis, &config).unwrap();
        assert!(outputs[0].listing.is_none());
        assert!(outputs[0].binary.is_some());
    }
}
