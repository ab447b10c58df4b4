//! Intel HEX record filtering.
//!
//! Lines are parsed into [`HexRecord`]s and anything a standard loader would
//! not understand is dropped without a diagnostic: blank lines, lines without
//! the `:` marker, truncated lines, non-hex characters, and record types
//! outside 00..=05 (for example the micro:bit Universal Hex block type 0x0A).
//! Checksums are carried through but never validated.

use std::fmt;

/// Marker + byte count + address + type + checksum.
pub const MIN_RECORD_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
}

impl RecordType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Data),
            0x01 => Some(Self::EndOfFile),
            0x02 => Some(Self::ExtendedSegmentAddress),
            0x03 => Some(Self::StartSegmentAddress),
            0x04 => Some(Self::ExtendedLinearAddress),
            0x05 => Some(Self::StartLinearAddress),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Data => 0x00,
            Self::EndOfFile => 0x01,
            Self::ExtendedSegmentAddress => 0x02,
            Self::StartSegmentAddress => 0x03,
            Self::ExtendedLinearAddress => 0x04,
            Self::StartLinearAddress => 0x05,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::EndOfFile => "end of file",
            Self::ExtendedSegmentAddress => "extended segment address",
            Self::StartSegmentAddress => "start segment address",
            Self::ExtendedLinearAddress => "extended linear address",
            Self::StartLinearAddress => "start linear address",
        }
    }
}

/// One parsed input line.
///
/// `byte_count` is the declared count; `data` holds whatever payload the line
/// actually carried. The two may disagree, which the segment builder rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexRecord {
    /// 1-based line number in the input.
    pub line: usize,
    pub byte_count: u8,
    pub address: u16,
    pub record_type: RecordType,
    pub data: Vec<u8>,
    pub checksum: u8,
}

/// Why a line did not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    Empty,
    MissingMarker,
    TooShort,
    Malformed,
    UnsupportedType(u8),
}

impl HexRecord {
    /// Parse a single line (without its line terminator).
    pub fn parse(line: &str, line_num: usize) -> Result<Self, DropReason> {
        let bytes = line.as_bytes();
        if bytes.is_empty() {
            return Err(DropReason::Empty);
        }
        if bytes[0] != b':' {
            return Err(DropReason::MissingMarker);
        }
        if bytes.len() < MIN_RECORD_LEN {
            return Err(DropReason::TooShort);
        }

        let hex = &bytes[1..];
        let type_code = hex_byte(&hex[6..8]).ok_or(DropReason::Malformed)?;
        let record_type =
            RecordType::from_code(type_code).ok_or(DropReason::UnsupportedType(type_code))?;

        let byte_count = hex_byte(&hex[0..2]).ok_or(DropReason::Malformed)?;
        let address_hi = hex_byte(&hex[2..4]).ok_or(DropReason::Malformed)?;
        let address_lo = hex_byte(&hex[4..6]).ok_or(DropReason::Malformed)?;

        let tail = &hex[8..];
        if !tail.len().is_multiple_of(2) {
            return Err(DropReason::Malformed);
        }
        let mut payload = tail
            .chunks_exact(2)
            .map(hex_byte)
            .collect::<Option<Vec<u8>>>()
            .ok_or(DropReason::Malformed)?;
        let checksum = payload.pop().ok_or(DropReason::Malformed)?;

        Ok(Self {
            line: line_num,
            byte_count,
            address: u16::from_be_bytes([address_hi, address_lo]),
            record_type,
            data: payload,
            checksum,
        })
    }

    /// Re-serialize the record as it was read, checksum included.
    pub fn write_line(&self, output: &mut Vec<u8>) {
        let addr_bytes = self.address.to_be_bytes();
        output.push(b':');
        write_hex_byte(output, self.byte_count);
        write_hex_byte(output, addr_bytes[0]);
        write_hex_byte(output, addr_bytes[1]);
        write_hex_byte(output, self.record_type.code());
        for &b in &self.data {
            write_hex_byte(output, b);
        }
        write_hex_byte(output, self.checksum);
        output.push(b'\n');
    }
}

/// Counters kept by [`RecordFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub empty: usize,
    pub missing_marker: usize,
    pub too_short: usize,
    pub malformed: usize,
    pub unsupported_type: usize,
}

impl FilterStats {
    pub fn dropped(&self) -> usize {
        self.empty + self.missing_marker + self.too_short + self.malformed + self.unsupported_type
    }

    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::Empty => self.empty += 1,
            DropReason::MissingMarker => self.missing_marker += 1,
            DropReason::TooShort => self.too_short += 1,
            DropReason::Malformed => self.malformed += 1,
            DropReason::UnsupportedType(_) => self.unsupported_type += 1,
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kept {}, dropped {} (empty {}, no marker {}, short {}, malformed {}, unsupported type {})",
            self.kept,
            self.dropped(),
            self.empty,
            self.missing_marker,
            self.too_short,
            self.malformed,
            self.unsupported_type
        )
    }
}

/// Lazy line -> record filter. Line numbers count every input line.
#[derive(Debug, Clone)]
pub struct RecordFilter<I> {
    lines: I,
    line_num: usize,
    stats: FilterStats,
}

impl<I> RecordFilter<I> {
    pub fn stats(&self) -> FilterStats {
        self.stats
    }
}

impl<I, S> Iterator for RecordFilter<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = HexRecord;

    fn next(&mut self) -> Option<HexRecord> {
        for line in self.lines.by_ref() {
            self.line_num += 1;
            match HexRecord::parse(line.as_ref(), self.line_num) {
                Ok(record) => {
                    self.stats.kept += 1;
                    return Some(record);
                }
                Err(reason) => self.stats.record_drop(reason),
            }
        }
        None
    }
}

/// Filter text lines down to standard Intel HEX records.
pub fn filter_records<I>(lines: I) -> RecordFilter<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    RecordFilter {
        lines: lines.into_iter(),
        line_num: 0,
        stats: FilterStats::default(),
    }
}

/// Split raw input into lines, ignoring any non-ASCII bytes and trailing
/// whitespace (including `\r`).
pub fn read_lines(input: &[u8]) -> impl Iterator<Item = String> + '_ {
    let input = input.strip_suffix(b"\n").unwrap_or(input);
    input.split(|&b| b == b'\n').map(|line| {
        let text: String = line
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| char::from(b))
            .collect();
        text.trim_end().to_string()
    })
}

/// Write records back out as Intel HEX text.
pub fn write_records<'a, I>(records: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a HexRecord>,
{
    let mut output = Vec::new();
    for record in records {
        record.write_line(&mut output);
    }
    output
}

fn write_hex_byte(output: &mut Vec<u8>, byte: u8) {
    const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
    output.push(HEX_CHARS[(byte >> 4) as usize]);
    output.push(HEX_CHARS[(byte & 0x0F) as usize]);
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let high = hex_digit(*pair.first()?)?;
    let low = hex_digit(*pair.get(1)?)?;
    Some((high << 4) | low)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_record() {
        let record = HexRecord::parse(":10010000214601360121470136007EFE09D2190140", 1).unwrap();
        assert_eq!(record.byte_count, 0x10);
        assert_eq!(record.address, 0x0100);
        assert_eq!(record.record_type, RecordType::Data);
        assert_eq!(record.data.len(), 16);
        assert_eq!(record.data[0], 0x21);
        assert_eq!(record.checksum, 0x40);
    }

    #[test]
    fn test_parse_eof_record() {
        let record = HexRecord::parse(":00000001FF", 7).unwrap();
        assert_eq!(record.record_type, RecordType::EndOfFile);
        assert_eq!(record.line, 7);
        assert!(record.data.is_empty());
    }

    #[test]
    fn test_drop_reasons() {
        assert_eq!(HexRecord::parse("", 1), Err(DropReason::Empty));
        assert_eq!(
            HexRecord::parse("10010000214601", 1),
            Err(DropReason::MissingMarker)
        );
        assert_eq!(HexRecord::parse(":0000000", 1), Err(DropReason::TooShort));
        assert_eq!(
            HexRecord::parse(":0000000AF6", 1),
            Err(DropReason::UnsupportedType(0x0A))
        );
        assert_eq!(HexRecord::parse(":0000000ZFF", 1), Err(DropReason::Malformed));
        assert_eq!(HexRecord::parse(":01000000AXFF", 1), Err(DropReason::Malformed));
        assert_eq!(HexRecord::parse(":01000000AAF", 1), Err(DropReason::Malformed));
    }

    #[test]
    fn test_checksum_not_validated() {
        let record = HexRecord::parse(":0400000001020304AA", 1).unwrap();
        assert_eq!(record.data, vec![1, 2, 3, 4]);
        assert_eq!(record.checksum, 0xAA);
    }

    #[test]
    fn test_byte_count_mismatch_passes_filter() {
        let record = HexRecord::parse(":04000000AABBFF", 1).unwrap();
        assert_eq!(record.byte_count, 4);
        assert_eq!(record.data, vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_filter_keeps_standard_types_and_counts_drops() {
        let lines = [
            ":020000040800F2",
            ":0400000A9900C0DEBB",
            "garbage",
            "",
            ":0400000001020304F2",
            ":00000001FF",
        ];
        let mut filter = filter_records(lines);
        let records: Vec<HexRecord> = filter.by_ref().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].line, 5);

        let stats = filter.stats();
        assert_eq!(stats.kept, 3);
        assert_eq!(stats.unsupported_type, 1);
        assert_eq!(stats.missing_marker, 1);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.dropped(), 3);
    }

    #[test]
    fn test_read_lines_strips_noise() {
        let input = b":00000001FF\r\n:0000\xC3\xA90001FF  \n";
        let lines: Vec<String> = read_lines(input).collect();
        assert_eq!(lines, vec![":00000001FF", ":00000001FF"]);
    }

    #[test]
    fn test_write_records_preserves_text() {
        let text = ":020000040800F2\n:0400000001020304F2\n:00000001FF\n";
        let records: Vec<HexRecord> = filter_records(read_lines(text.as_bytes())).collect();
        assert_eq!(write_records(&records), text.as_bytes());
    }
}
