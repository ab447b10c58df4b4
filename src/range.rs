use thiserror::Error;

#[derive(Debug, Error)]
pub enum RangeError {
    #[error("address overflow: {start:#X} + {length} exceeds u32")]
    AddressOverflow { start: u32, length: u64 },

    #[error("zero length range at {start:#X}")]
    ZeroLength { start: u32 },
}

/// A non-empty memory address range, stored as start and inclusive end.
///
/// Lengths are `u64` so a range may reach `0xFFFFFFFF` without the exclusive
/// end overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    start: u32,
    end: u32, // inclusive
}

impl Range {
    /// Create range from start address and length.
    pub fn from_start_length(start: u32, length: u64) -> Result<Self, RangeError> {
        if length == 0 {
            return Err(RangeError::ZeroLength { start });
        }
        let end = u64::from(start) + length - 1;
        let end = u32::try_from(end).map_err(|_| RangeError::AddressOverflow { start, length })?;
        Ok(Self { start, end })
    }

    pub(crate) fn inclusive(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "range start exceeds end");
        Self { start, end }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// One past the last address.
    pub fn end_exclusive(&self) -> u64 {
        u64::from(self.end) + 1
    }

    pub fn length(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }
}
