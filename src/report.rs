//! Text reports. The `format_*` functions are pure; [`ReportWriter`] puts
//! their output at the paths given by an [`OutputLayout`].

use std::path::PathBuf;

use crate::analysis::{ResetVector, SegmentAnalysis, VectorEntry};
use crate::builder::StartAddress;
use crate::decode::DecodedInstruction;
use crate::io::{ExportError, OutputLayout, write_file};
use crate::{Segment, SegmentBuffer};

/// `SEG00: 0x00000000 - 0x000000FF (size 256)`, end inclusive.
pub fn format_segment_summary<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut out = String::new();
    for segment in segments {
        out.push_str(&format!(
            "{}: 0x{:08X} - 0x{:08X} (size {})\n",
            segment.label(),
            segment.start_address(),
            segment.end_address(),
            segment.size()
        ));
    }
    out
}

pub fn format_listing(buffer: &SegmentBuffer, instructions: &[DecodedInstruction]) -> String {
    let mut out = format!(
        "; Base address: 0x{:08X}\n; Size: {} bytes\n\n",
        buffer.start_address,
        buffer.len()
    );
    for insn in instructions {
        out.push_str(&format!(
            "0x{:08X}:\t{}\t{}\n",
            insn.address, insn.mnemonic, insn.operands
        ));
    }
    out
}

/// Segments reloaded from sidecars keep the binary name the sidecar recorded.
fn binary_name(layout: &OutputLayout, analysis: &SegmentAnalysis) -> String {
    analysis
        .binary
        .clone()
        .unwrap_or_else(|| layout.bin_name(&analysis.segment))
}

pub fn format_strings_report(layout: &OutputLayout, analyses: &[SegmentAnalysis]) -> String {
    let mut out = String::new();
    for analysis in analyses {
        out.push_str(&format!(
            "# {} @ 0x{:08X} (found {} strings)\n",
            binary_name(layout, analysis),
            analysis.segment.start_address(),
            analysis.strings.len()
        ));
        for found in &analysis.strings {
            out.push_str(&format!("0x{:08X}: {}\n", found.address, found.text));
        }
        out.push('\n');
    }
    out
}

pub fn format_functions_report(layout: &OutputLayout, analyses: &[SegmentAnalysis]) -> String {
    let mut out = String::new();
    for analysis in analyses {
        out.push_str(&format!(
            "# {} @ 0x{:08X} (heuristic function starts: {})\n",
            binary_name(layout, analysis),
            analysis.segment.start_address(),
            analysis.functions.len()
        ));
        for addr in &analysis.functions {
            out.push_str(&format!("0x{addr:08X}\n"));
        }
        out.push('\n');
    }
    out
}

pub fn format_reset_vector(vector: &ResetVector, start_address: Option<StartAddress>) -> String {
    let mut out = format!(
        "Initial_SP = 0x{:08X}\nReset_Handler = 0x{:08X}\n",
        vector.initial_stack_pointer, vector.reset_handler
    );
    match start_address {
        Some(StartAddress::Linear(addr)) => {
            out.push_str(&format!("Start_Address = 0x{addr:08X}\n"));
        }
        Some(start @ StartAddress::Segment { .. }) => {
            out.push_str(&format!("Start_Segment = {start}\n"));
        }
        None => {}
    }
    out
}

pub fn format_core_vectors(entries: &[VectorEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "[{:2}] 0x{:08X} {:<12} = 0x{:08X}\n",
                entry.index,
                entry.slot_address,
                entry.name,
                entry.target()
            )
        })
        .collect()
}

/// Writes reports next to the exported segments.
#[derive(Debug, Clone)]
pub struct ReportWriter<'a> {
    layout: &'a OutputLayout,
}

impl<'a> ReportWriter<'a> {
    pub fn new(layout: &'a OutputLayout) -> Self {
        Self { layout }
    }

    pub fn write_summary(&self, segments: &[Segment]) -> Result<PathBuf, ExportError> {
        self.write(self.layout.summary_path(), format_segment_summary(segments))
    }

    pub fn write_listing(
        &self,
        segment: &Segment,
        buffer: &SegmentBuffer,
        instructions: &[DecodedInstruction],
    ) -> Result<PathBuf, ExportError> {
        self.write(
            self.layout.listing_path(segment),
            format_listing(buffer, instructions),
        )
    }

    pub fn write_strings(&self, analyses: &[SegmentAnalysis]) -> Result<PathBuf, ExportError> {
        self.write(
            self.layout.strings_path(),
            format_strings_report(self.layout, analyses),
        )
    }

    pub fn write_functions(&self, analyses: &[SegmentAnalysis]) -> Result<PathBuf, ExportError> {
        self.write(
            self.layout.functions_path(),
            format_functions_report(self.layout, analyses),
        )
    }

    pub fn write_reset_vector(
        &self,
        vector: &ResetVector,
        start_address: Option<StartAddress>,
    ) -> Result<PathBuf, ExportError> {
        self.write(
            self.layout.reset_vector_path(),
            format_reset_vector(vector, start_address),
        )
    }

    pub fn write_core_vectors(&self, entries: &[VectorEntry]) -> Result<PathBuf, ExportError> {
        self.write(self.layout.vectors_path(), format_core_vectors(entries))
    }

    fn write(&self, path: PathBuf, text: String) -> Result<PathBuf, ExportError> {
        write_file(&path, text.as_bytes())?;
        Ok(path)
    }
}
