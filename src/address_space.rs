use std::collections::BTreeMap;

use crate::{Range, Segment};

/// Sparse 32-bit address space: absolute address -> byte.
///
/// Writes are applied in call order, so a later write to an address
/// overwrites an earlier one ("last wins").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSpace {
    bytes: BTreeMap<u32, u8>,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of populated addresses.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Write `data` starting at `addr`.
    ///
    /// Bytes that would land past `0xFFFFFFFF` are dropped, never wrapped.
    /// Returns the number of bytes dropped.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> usize {
        for (offset, &byte) in data.iter().enumerate() {
            let Some(target) = u32::try_from(offset)
                .ok()
                .and_then(|offset| addr.checked_add(offset))
            else {
                return data.len() - offset;
            };
            self.bytes.insert(target, byte);
        }
        0
    }

    /// Bytes of `range` in address order. Gaps are skipped, so the result is
    /// only `range.length()` long when the range is fully populated.
    pub fn read_range(&self, range: Range) -> Vec<u8> {
        self.bytes
            .range(range.start()..=range.end())
            .map(|(_, &byte)| byte)
            .collect()
    }

    /// Partition the populated addresses into maximal contiguous runs,
    /// ascending, numbered from 0.
    pub fn segments(&self) -> Vec<Segment> {
        let mut addresses = self.bytes.keys().copied();
        let Some(first) = addresses.next() else {
            return Vec::new();
        };

        let mut ranges = Vec::new();
        let (mut start, mut end) = (first, first);
        for addr in addresses {
            if end.checked_add(1) == Some(addr) {
                end = addr;
            } else {
                ranges.push(Range::inclusive(start, end));
                start = addr;
                end = addr;
            }
        }
        ranges.push(Range::inclusive(start, end));

        ranges
            .into_iter()
            .enumerate()
            .map(|(id, range)| Segment::new(id, range))
            .collect()
    }
}
