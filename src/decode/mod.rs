//! Instruction decoding capability.
//!
//! The analysis never decodes bytes itself; it asks an [`InstructionDecoder`]
//! for a little-endian Thumb instruction stream. The production binding uses
//! Capstone (feature `capstone`), tests bind scripted decoders.

#[cfg(feature = "capstone")]
mod thumb;

use thiserror::Error;

#[cfg(feature = "capstone")]
pub use self::thumb::ThumbDecoder;

/// One decoded instruction, as produced by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub address: u32,
    pub mnemonic: String,
    pub operands: String,
}

impl DecodedInstruction {
    pub fn new(address: u32, mnemonic: impl Into<String>, operands: impl Into<String>) -> Self {
        Self {
            address,
            mnemonic: mnemonic.into(),
            operands: operands.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decoder initialization failed: {0}")]
    Init(String),

    #[error("decoding at {address:#010X} failed: {message}")]
    Decode { address: u32, message: String },
}

pub trait InstructionDecoder {
    /// Decode `bytes` as if loaded at `base_address`. Decoding stops at the
    /// end of the buffer or at the first undecodable instruction.
    fn decode(
        &self,
        bytes: &[u8],
        base_address: u32,
    ) -> Result<Vec<DecodedInstruction>, DecodeError>;
}

/// The decoder bound at build time, if one is available.
///
/// Returns `None` when the Capstone backend fails to initialize; callers then
/// skip listings and function detection.
#[cfg(feature = "capstone")]
pub fn default_decoder() -> Option<Box<dyn InstructionDecoder>> {
    match ThumbDecoder::new() {
        Ok(decoder) => Some(Box::new(decoder)),
        Err(e) => {
            log::warn!("{e}; disassembly and function detection disabled");
            None
        }
    }
}

/// Built without a decoder backend: always `None`.
#[cfg(not(feature = "capstone"))]
pub fn default_decoder() -> Option<Box<dyn InstructionDecoder>> {
    log::warn!("built without a decoder backend; disassembly and function detection disabled");
    None
}
