//! Segment reconstruction from filtered Intel HEX records.

use std::borrow::Borrow;
use std::fmt;

use crate::io::{HexRecord, ParseError, RecordType, export_segment};
use crate::{AddressSpace, Segment, SegmentBuffer};

/// Execution start address declared by a type 03 or 05 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAddress {
    /// CS:IP pair from a start segment address record.
    Segment { cs: u16, ip: u16 },
    /// EIP from a start linear address record.
    Linear(u32),
}

impl fmt::Display for StartAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment { cs, ip } => write!(f, "0x{cs:04X}:0x{ip:04X}"),
            Self::Linear(addr) => write!(f, "0x{addr:08X}"),
        }
    }
}

/// Result of folding every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub address_space: AddressSpace,
    pub segments: Vec<(Segment, SegmentBuffer)>,
    pub start_address: Option<StartAddress>,
}

/// Fold state threaded through the record loop.
#[derive(Debug, Clone, Default)]
struct Fold {
    space: AddressSpace,
    /// Upper address bits set by the last type 02/04 record.
    base: u32,
    eof_line: Option<usize>,
    records_after_eof: usize,
    dropped_bytes: usize,
    start_address: Option<StartAddress>,
}

impl Fold {
    fn apply(mut self, record: &HexRecord) -> Result<Self, ParseError> {
        if usize::from(record.byte_count) != record.data.len() {
            return Err(ParseError::ByteCountMismatch {
                line: record.line,
                declared: record.byte_count,
                actual: record.data.len(),
            });
        }
        if self.eof_line.is_some() {
            self.records_after_eof += 1;
        }

        match record.record_type {
            RecordType::Data => {
                // base <= 0xFFFF0000, so the record start always fits.
                let start = self.base + u32::from(record.address);
                self.dropped_bytes += self.space.write(start, &record.data);
            }
            RecordType::EndOfFile => {
                self.eof_line.get_or_insert(record.line);
            }
            RecordType::ExtendedSegmentAddress => {
                let value = address_word(record)?;
                self.base = u32::from(value) << 4;
            }
            RecordType::ExtendedLinearAddress => {
                let value = address_word(record)?;
                self.base = u32::from(value) << 16;
            }
            RecordType::StartSegmentAddress => {
                let [cs_hi, cs_lo, ip_hi, ip_lo] = start_bytes(record)?;
                self.start_address = Some(StartAddress::Segment {
                    cs: u16::from_be_bytes([cs_hi, cs_lo]),
                    ip: u16::from_be_bytes([ip_hi, ip_lo]),
                });
            }
            RecordType::StartLinearAddress => {
                let bytes = start_bytes(record)?;
                self.start_address = Some(StartAddress::Linear(u32::from_be_bytes(bytes)));
            }
        }
        Ok(self)
    }
}

fn address_word(record: &HexRecord) -> Result<u16, ParseError> {
    match record.data.as_slice() {
        &[hi, lo] => Ok(u16::from_be_bytes([hi, lo])),
        data => Err(ParseError::AddressRecordLength {
            line: record.line,
            record_type: record.record_type.name(),
            expected: 2,
            actual: data.len(),
        }),
    }
}

fn start_bytes(record: &HexRecord) -> Result<[u8; 4], ParseError> {
    <[u8; 4]>::try_from(record.data.as_slice()).map_err(|_| ParseError::AddressRecordLength {
        line: record.line,
        record_type: record.record_type.name(),
        expected: 4,
        actual: record.data.len(),
    })
}

/// Fold records into an address space and cut it into segments.
///
/// The extended address context starts at 0 and only changes on type 02/04
/// records. An end-of-file record does not stop the fold; later records are
/// still applied and reported with a warning.
pub fn build_segments<I>(records: I) -> Result<BuildOutput, ParseError>
where
    I: IntoIterator,
    I::Item: Borrow<HexRecord>,
{
    let fold = records
        .into_iter()
        .try_fold(Fold::default(), |fold, record| fold.apply(record.borrow()))?;

    if let Some(line) = fold.eof_line
        && fold.records_after_eof > 0
    {
        log::warn!(
            "{} record(s) follow the end-of-file record at line {line}",
            fold.records_after_eof
        );
    }
    if fold.dropped_bytes > 0 {
        log::warn!(
            "dropped {} data byte(s) beyond the 32-bit address space",
            fold.dropped_bytes
        );
    }

    let segments: Vec<(Segment, SegmentBuffer)> = fold
        .space
        .segments()
        .into_iter()
        .map(|segment| {
            let buffer = export_segment(&fold.space, &segment);
            (segment, buffer)
        })
        .collect();
    log::debug!(
        "rebuilt {} byte(s) into {} segment(s)",
        fold.space.len(),
        segments.len()
    );

    Ok(BuildOutput {
        address_space: fold.space,
        segments,
        start_address: fold.start_address,
    })
}
