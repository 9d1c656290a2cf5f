use std::fmt::{Debug, Formatter};

/// Every field of one machine word, extracted unconditionally.
///
/// Hardware fans the instruction bus out to all field decoders at once;
/// doing the same here means the executor only ever selects fields, never
/// parses. Which fields carry meaning depends on the opcode.
#[expect(
    clippy::struct_excessive_bools,
    reason = "each bool is a decoded one-bit field of the word"
)]
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub raw: u16,
    /// Opcode, bits 15..12.
    pub opcode: u16,
    /// Destination register (the stored register for ST/STI/STR), bits 11..9.
    pub dr: u8,
    /// First source or base register, bits 8..6.
    pub sr1: u8,
    /// Second source register, bits 2..0.
    pub sr2: u8,
    /// Immediate-mode selector of ADD/AND, bit 5.
    pub imm_mode: bool,
    /// 5-bit literal, bits 4..0, not yet sign-extended.
    pub imm5: u16,
    /// PC-relative offset, bits 8..0.
    pub pcoffset9: u16,
    /// PC-relative offset of JSR, bits 10..0.
    pub pcoffset11: u16,
    /// Base-register offset, bits 5..0.
    pub offset6: u16,
    /// Branch condition request bits 11, 10 and 9.
    pub n: bool,
    pub z: bool,
    pub p: bool,
    /// Bit 11 again, as the JSR/JSRR form selector.
    pub pc_relative: bool,
    /// Trap vector, bits 7..0.
    pub trapvect8: u8,
}

/// The value of `width` bits starting at bit `low`.
const fn field(raw: u16, low: u32, width: u32) -> u16 {
    (raw >> low) & ((1u16 << width) - 1)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "masked to three bits right above"
)]
const fn register_field(raw: u16, low: u32) -> u8 {
    field(raw, low, 3) as u8
}

const fn bit(raw: u16, index: u32) -> bool {
    (raw >> index) & 1 == 1
}

impl From<u16> for Instruction {
    fn from(raw: u16) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "trap vector is masked to eight bits"
        )]
        let trapvect8 = field(raw, 0, 8) as u8;
        Self {
            raw,
            opcode: field(raw, 12, 4),
            dr: register_field(raw, 9),
            sr1: register_field(raw, 6),
            sr2: register_field(raw, 0),
            imm_mode: bit(raw, 5),
            imm5: field(raw, 0, 5),
            pcoffset9: field(raw, 0, 9),
            pcoffset11: field(raw, 0, 11),
            offset6: field(raw, 0, 6),
            n: bit(raw, 11),
            z: bit(raw, 10),
            p: bit(raw, 9),
            pc_relative: bit(raw, 11),
            trapvect8,
        }
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Op: {:04b}, word: {:#06x}", self.opcode, self.raw)
    }
}
