use capstone::prelude::*;

use super::{DecodeError, DecodedInstruction, InstructionDecoder};

/// ARM Thumb decoder for M-class cores, backed by Capstone.
pub struct ThumbDecoder {
    cs: Capstone,
}

impl ThumbDecoder {
    pub fn new() -> Result<Self, DecodeError> {
        let cs = Capstone::new()
            .arm()
            .mode(arch::arm::ArchMode::Thumb)
            .extra_mode([arch::arm::ArchExtraMode::MClass].iter().copied())
            .detail(false)
            .build()
            .map_err(|e| DecodeError::Init(format!("Capstone for ARM Cortex-M: {e}")))?;
        Ok(Self { cs })
    }
}

impl InstructionDecoder for ThumbDecoder {
    fn decode(
        &self,
        bytes: &[u8],
        base_address: u32,
    ) -> Result<Vec<DecodedInstruction>, DecodeError> {
        let instructions = self
            .cs
            .disasm_all(bytes, u64::from(base_address))
            .map_err(|e| DecodeError::Decode {
                address: base_address,
                message: e.to_string(),
            })?;

        Ok(instructions
            .iter()
            .map(|insn| DecodedInstruction {
                // Capstone reports addresses relative to the u64 base we
                // passed, which started inside the 32-bit space.
                address: insn.address() as u32,
                mnemonic: insn.mnemonic().unwrap_or_default().to_string(),
                operands: insn.op_str().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
