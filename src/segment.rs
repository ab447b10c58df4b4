use crate::Range;

/// A maximal run of contiguous populated addresses.
///
/// `id` is the segment's position in ascending address order and names its
/// exported files (`SEG00`, `_seg00.bin`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub id: usize,
    range: Range,
}

impl Segment {
    pub fn new(id: usize, range: Range) -> Self {
        Self { id, range }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn start_address(&self) -> u32 {
        self.range.start()
    }

    /// Last populated address (inclusive).
    pub fn end_address(&self) -> u32 {
        self.range.end()
    }

    /// One past the last populated address.
    pub fn end_exclusive(&self) -> u64 {
        self.range.end_exclusive()
    }

    pub fn size(&self) -> u64 {
        self.range.length()
    }

    /// `SEG00`-style label used in the summary and progress output.
    pub fn label(&self) -> String {
        format!("SEG{:02}", self.id)
    }
}

/// The raw bytes of one segment, tagged with its base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentBuffer {
    pub start_address: u32,
    pub data: Vec<u8>,
}

impl SegmentBuffer {
    pub fn new(start_address: u32, data: Vec<u8>) -> Self {
        debug_assert!(
            u64::from(start_address) + data.len() as u64 <= 1 << 32,
            "segment buffer exceeds the 32-bit address space"
        );
        Self {
            start_address,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Little-endian word at byte `offset`, if the buffer holds all four bytes.
    pub fn read_u32_le(&self, offset: usize) -> Option<u32> {
        let bytes = self.data.get(offset..offset.checked_add(4)?)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
