use crate::SegmentBuffer;

/// Bit 0 of a Thumb branch target selects the instruction set, not an address.
pub const THUMB_BIT: u32 = 1;

/// Initial stack pointer and reset handler from the start of the vector table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetVector {
    pub initial_stack_pointer: u32,
    /// Word 1 with the Thumb bit cleared.
    pub reset_handler: u32,
}

impl ResetVector {
    /// Read the first two little-endian words. `None` if the buffer is
    /// shorter than 8 bytes.
    pub fn read(buffer: &SegmentBuffer) -> Option<Self> {
        let initial_stack_pointer = buffer.read_u32_le(0)?;
        let reset_word = buffer.read_u32_le(4)?;
        Some(Self {
            initial_stack_pointer,
            reset_handler: reset_word & !THUMB_BIT,
        })
    }
}

/// Names of the 16 Cortex-M core exception slots.
pub const CORE_EXCEPTIONS: [&str; 16] = [
    "Initial_SP",
    "Reset",
    "NMI",
    "HardFault",
    "MemManage",
    "BusFault",
    "UsageFault",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "SVCall",
    "DebugMonitor",
    "Reserved",
    "PendSV",
    "SysTick",
];

/// One slot of the core exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorEntry {
    pub index: usize,
    pub name: &'static str,
    /// Address of the slot itself.
    pub slot_address: u32,
    pub value: u32,
}

impl VectorEntry {
    /// Handler address with the Thumb bit cleared. Slot 0 holds the stack
    /// pointer and is returned as-is.
    pub fn target(&self) -> u32 {
        if self.index == 0 {
            self.value
        } else {
            self.value & !THUMB_BIT
        }
    }
}

/// Decode as many of the 16 core exception slots as the buffer fully holds.
pub fn read_core_vectors(buffer: &SegmentBuffer) -> Vec<VectorEntry> {
    CORE_EXCEPTIONS
        .iter()
        .enumerate()
        .map_while(|(index, &name)| {
            let value = buffer.read_u32_le(index * 4)?;
            Some(VectorEntry {
                index,
                name,
                slot_address: buffer.start_address.wrapping_add((index * 4) as u32),
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_vector_clears_thumb_bit() {
        let buf = SegmentBuffer::new(0, vec![0x00, 0x10, 0x00, 0x20, 0x01, 0x00, 0x00, 0x08]);
        let rv = ResetVector::read(&buf).unwrap();
        assert_eq!(rv.initial_stack_pointer, 0x2000_1000);
        assert_eq!(rv.reset_handler, 0x0800_0000);
        // The raw word stays available through the vector table entry.
        assert_eq!(read_core_vectors(&buf)[1].value, 0x0800_0001);
    }

    #[test]
    fn test_reset_vector_even_word_unchanged() {
        let buf = SegmentBuffer::new(0, vec![0, 0, 0, 0x20, 0xC0, 0x00, 0x00, 0x00]);
        let rv = ResetVector::read(&buf).unwrap();
        assert_eq!(rv.reset_handler, 0xC0);
    }

    #[test]
    fn test_short_buffer_has_no_vector() {
        let buf = SegmentBuffer::new(0, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(ResetVector::read(&buf), None);
        let buf = SegmentBuffer::new(0, vec![0; 7]);
        assert_eq!(ResetVector::read(&buf), None);
    }

    #[test]
    fn test_core_vectors_partial_table() {
        let mut data = Vec::new();
        for word in [0x2000_4000u32, 0x0000_00C1, 0x0000_00D3] {
            data.extend_from_slice(&word.to_le_bytes());
        }
        data.push(0xFF);
        let buf = SegmentBuffer::new(0x0800_0000, data);
        let entries = read_core_vectors(&buf);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].target(), 0x2000_4000);
        assert_eq!(entries[1].name, "Reset");
        assert_eq!(entries[1].target(), 0xC0);
        assert_eq!(entries[2].name, "NMI");
        assert_eq!(entries[2].slot_address, 0x0800_0008);
        assert_eq!(entries[2].target(), 0xD2);
    }

    #[test]
    fn test_core_vectors_full_table() {
        let buf = SegmentBuffer::new(0, vec![0x01; 128]);
        let entries = read_core_vectors(&buf);
        assert_eq!(entries.len(), 16);
        assert_eq!(entries[15].name, "SysTick");
    }
}
