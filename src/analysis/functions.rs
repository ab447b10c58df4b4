//! Heuristic function-start detection from Thumb prologues.
//!
//! Two prologue shapes are recognised: a `push` that saves `lr`, and a
//! `sub sp, ...` frame allocation. Either may appear first (or alone)
//! depending on the compiler, so both are flagged. The result is advisory:
//! mid-function stack adjustments produce false positives and unusual
//! prologues are missed.

use std::collections::HashSet;

use crate::decode::DecodedInstruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prologue {
    /// `push {..., lr}`
    SaveLinkRegister,
    /// `sub sp, ...`
    AllocateFrame,
}

pub fn classify_prologue(insn: &DecodedInstruction) -> Option<Prologue> {
    let mnemonic = insn.mnemonic.as_str();
    if mnemonic.eq_ignore_ascii_case("push") && insn.operands.contains("lr") {
        Some(Prologue::SaveLinkRegister)
    } else if mnemonic.eq_ignore_ascii_case("sub") && insn.operands.starts_with("sp,") {
        Some(Prologue::AllocateFrame)
    } else {
        None
    }
}

/// Candidate function starts, deduplicated in first-seen order.
pub fn find_function_starts<'a, I>(instructions: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a DecodedInstruction>,
{
    let mut seen = HashSet::new();
    instructions
        .into_iter()
        .filter(|insn| classify_prologue(insn).is_some())
        .map(|insn| insn.address)
        .filter(|addr| seen.insert(*addr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insn(address: u32, mnemonic: &str, operands: &str) -> DecodedInstruction {
        DecodedInstruction::new(address, mnemonic, operands)
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_prologue(&insn(0, "push", "{r4, r5, r7, lr}")),
            Some(Prologue::SaveLinkRegister)
        );
        assert_eq!(
            classify_prologue(&insn(0, "sub", "sp, #0x14")),
            Some(Prologue::AllocateFrame)
        );
        assert_eq!(classify_prologue(&insn(0, "push", "{r4, r5}")), None);
        assert_eq!(classify_prologue(&insn(0, "sub", "r0, sp, #4")), None);
        assert_eq!(
            classify_prologue(&insn(0, "sub", "sp, sp, #4")),
            Some(Prologue::AllocateFrame)
        );
        assert_eq!(classify_prologue(&insn(0, "pop", "{r4, pc}")), None);
    }

    #[test]
    fn test_both_patterns_flagged_in_order() {
        let stream = vec![
            insn(0x100, "push", "{r7, lr}"),
            insn(0x102, "sub", "sp, #8"),
            insn(0x104, "movs", "r0, #0"),
            insn(0x106, "pop", "{r7, pc}"),
            insn(0x108, "sub", "sp, #0x10"),
            insn(0x10A, "bx", "lr"),
        ];
        assert_eq!(find_function_starts(&stream), vec![0x100, 0x102, 0x108]);
    }

    #[test]
    fn test_duplicates_removed_first_seen_order() {
        let stream = vec![
            insn(0x200, "push", "{lr}"),
            insn(0x100, "sub", "sp, #4"),
            insn(0x200, "sub", "sp, #4"),
        ];
        assert_eq!(find_function_starts(&stream), vec![0x200, 0x100]);
    }

    #[test]
    fn test_empty_stream() {
        let stream: Vec<DecodedInstruction> = Vec::new();
        assert!(find_function_starts(&stream).is_empty());
    }
}
