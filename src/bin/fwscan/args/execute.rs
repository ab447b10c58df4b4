use std::path::{Path, PathBuf};

use fwscan::pipeline::{self, Analysis, SegmentOutputs};
use fwscan::{AnalysisConfig, InstructionDecoder, OutputLayout, default_decoder};

use super::error::CliError;
use super::io::{display_name, load_config, resolve_layout, resolve_report_layout};
use super::types::{Cli, Command};

impl Cli {
    pub fn execute(&self) -> Result<(), CliError> {
        let config = load_config(&self.global)?;
        let decoder = default_decoder();
        let decoder = decoder.as_deref();

        match self.command {
            Command::Extract {
                ref input,
                ref output,
            } => {
                let layout = resolve_layout(input, output.as_ref());
                let analysis = extract_stage(input, &layout, decoder, &config)?;
                log::info!("extracted {} segment(s)", analysis.segments.len());
            }
            Command::Report {
                ref sidecars,
                ref output,
            } => {
                let layout = resolve_report_layout(sidecars, output.as_ref())?;
                let loaded = pipeline::load_segments(&sidecars[..])?;
                let analysis = pipeline::analyze_loaded(loaded, decoder, &config)?;
                report_stage(&layout, &analysis)?;
            }
            Command::Analyze {
                ref input,
                ref output,
            } => {
                let layout = resolve_layout(input, output.as_ref());
                let analysis = extract_stage(input, &layout, decoder, &config)?;
                report_stage(&layout, &analysis)?;
            }
        }

        println!("DONE");
        Ok(())
    }
}

fn extract_stage(
    input: &Path,
    layout: &OutputLayout,
    decoder: Option<&dyn InstructionDecoder>,
    config: &AnalysisConfig,
) -> Result<Analysis, CliError> {
    let content = pipeline::read_input(input)?;
    let extraction = pipeline::extract(&content)?;

    if config.output.write_filtered_hex {
        let path = pipeline::write_filtered_hex(layout, &extraction.records)?;
        log::debug!("wrote {}", path.display());
    }

    let analysis = pipeline::analyze(
        extraction.segments,
        extraction.start_address,
        decoder,
        config,
    )?;
    let (outputs, summary) = pipeline::write_segments(layout, &analysis, config)?;
    for output in &outputs {
        println!("{}", progress_line(output));
    }
    log::debug!("wrote {}", summary.display());
    Ok(analysis)
}

fn report_stage(layout: &OutputLayout, analysis: &Analysis) -> Result<(), CliError> {
    let reports = pipeline::write_reports(layout, analysis)?;
    let written: Vec<&PathBuf> = [Some(&reports.strings), Some(&reports.functions)]
        .into_iter()
        .chain([reports.reset_vector.as_ref(), reports.core_vectors.as_ref()])
        .flatten()
        .collect();
    for path in written {
        log::info!("wrote {}", path.display());
    }
    if reports.reset_vector.is_none() {
        log::warn!("lowest segment shorter than 8 bytes; reset vector report skipped");
    }
    Ok(())
}

fn progress_line(output: &SegmentOutputs) -> String {
    format!(
        "{} BASE=0x{:08X} SIZE={} -> BIN={} ASM={}",
        output.segment.label(),
        output.segment.start_address(),
        output.segment.size(),
        display_name(output.binary.as_ref()),
        display_name(output.listing.as_ref())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwscan::{Range, Segment};

    #[test]
    fn test_progress_line() {
        let output = SegmentOutputs {
            segment: Segment::new(1, Range::from_start_length(0x0800_0000, 16).unwrap()),
            binary: Some(PathBuf::from("out/fw_seg01.bin")),
            sidecar: Some(PathBuf::from("out/fw_seg01.json")),
            listing: None,
        };
        assert_eq!(
            progress_line(&output),
            "SEG01 BASE=0x08000000 SIZE=16 -> BIN=fw_seg01.bin ASM=-"
        );
    }
}
