/// The complete visible machine state at a cycle boundary: program counter,
/// one-hot condition flag and the eight-entry register file.
///
/// The simulator keeps two of these, "current" and "next"; see
/// [`crate::simulator::Simulator`] for the double-buffering discipline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Latches {
    pub pc: u16,
    regs: [u16; 8],
    cond: ConditionFlag,
}

impl Latches {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pc: 0,
            regs: [0u16; 8],
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// Asserts that `r` names one of R0..R7.
    #[must_use]
    pub fn get(&self, r: u8) -> u16 {
        assert!(r <= 7, "invalid general purpose register get");
        self.regs[usize::from(r)]
    }

    /// # Panics
    /// Asserts that `r` names one of R0..R7.
    pub fn set(&mut self, r: u8, value: u16) {
        assert!(r <= 7, "invalid general purpose register set");
        self.regs[usize::from(r)] = value;
    }

    /// Recomputes the condition flag from the value just written to `r`.
    pub fn update_condition(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r));
    }

    pub const fn condition(&self) -> ConditionFlag {
        self.cond
    }

    pub const fn registers(&self) -> &[u16; 8] {
        &self.regs
    }

    /// Forces the flag without a register write, used once at program load.
    pub(crate) const fn force_condition(&mut self, cond: ConditionFlag) {
        self.cond = cond;
    }
}

impl Default for Latches {
    fn default() -> Self {
        Self::new()
    }
}

/// One-hot N/Z/P condition codes.
///
/// Exactly one flag is set at any time the latches are valid; the closed
/// enum carries that invariant by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos,
    Zero,
    Neg,
}

impl ConditionFlag {
    /// True if the flag that is currently set was requested, with `n`, `z`
    /// and `p` being the request bits of a BR instruction. All three clear
    /// means no match.
    #[must_use]
    pub const fn matches(self, n: bool, z: bool, p: bool) -> bool {
        match self {
            Self::Neg => n,
            Self::Zero => z,
            Self::Pos => p,
        }
    }

    /// The three flag bits in dump order (N, Z, P).
    #[must_use]
    pub const fn bits(self) -> (u8, u8, u8) {
        match self {
            Self::Neg => (1, 0, 0),
            Self::Zero => (0, 1, 0),
            Self::Pos => (0, 0, 1),
        }
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[parameterized(
        zero = { 0x0000, ConditionFlag::Zero },
        one = { 0x0001, ConditionFlag::Pos },
        largest_positive = { 0x7FFF, ConditionFlag::Pos },
        smallest_negative = { 0x8000, ConditionFlag::Neg },
        minus_one = { 0xFFFF, ConditionFlag::Neg },
    )]
    fn condition_flag_from_value(value: u16, expected: ConditionFlag) {
        assert_eq!(ConditionFlag::from(value), expected);
    }

    #[gtest]
    fn condition_flag_is_one_hot() {
        for value in [0u16, 1, 42, 0x7FFF, 0x8000, 0xFFFF] {
            let (n, z, p) = ConditionFlag::from(value).bits();
            expect_that!(n + z + p, eq(1), "value {value:#06x}");
        }
    }

    #[gtest]
    fn update_condition_follows_the_written_register() {
        let mut latches = Latches::new();
        expect_that!(latches.condition(), eq(ConditionFlag::Zero));
        latches.set(3, 0x8001);
        latches.update_condition(3);
        expect_that!(latches.condition(), eq(ConditionFlag::Neg));
        latches.set(3, 7);
        latches.update_condition(3);
        expect_that!(latches.condition(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    fn registers_start_zeroed() {
        let latches = Latches::new();
        expect_that!(latches.pc, eq(0));
        expect_that!(*latches.registers(), eq([0u16; 8]));
    }

    #[test]
    #[should_panic(expected = "invalid general purpose register set")]
    fn set_rejects_register_numbers_above_seven() {
        let mut latches = Latches::new();
        latches.set(8, 1);
    }
}
