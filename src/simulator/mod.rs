//! The fetch-decode-execute engine with its double-buffered state.

pub mod instruction;
pub mod opcodes;

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::latches::{ConditionFlag, Latches};
use crate::hardware::memory::{LAST_ADDRESS, Memory, WORDS_IN_MEM};
use crate::image::ProgramImage;
use crate::simulator::instruction::Instruction;
use crate::simulator::opcodes::execute;

/// Program counter value meaning "stop": TRAP forces it and the run loop
/// refuses to execute from it.
pub const HALT_ADDRESS: u16 = 0x0000;

/// Why [`Simulator::run`] came back without an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run bit was already clear, nothing executed.
    AlreadyHalted,
    /// The program counter reached the halt sentinel.
    Halted { executed: u64 },
    /// The requested cycle budget ran out first.
    LimitReached { executed: u64 },
}

/// A complete LC-3 machine: memory, both latch sets, the run bit and the
/// instruction counter.
///
/// Each cycle the executor reads the current latches and writes the next
/// latches, which then replace the current ones as one atomic commit. In
/// between cycles both sets are equal. Strictly single-threaded; the
/// simulator owns all of its state exclusively.
#[derive(Debug)]
pub struct Simulator {
    memory: Memory,
    current: Latches,
    next: Latches,
    run_bit: bool,
    instruction_count: u64,
}

impl Simulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Memory::new(),
            current: Latches::new(),
            next: Latches::new(),
            run_bit: false,
            instruction_count: 0,
        }
    }

    /// Loads one program image: words go to the origin, the PC takes the
    /// origin if it is still zero (so the first of several images wins),
    /// the Z flag is forced, both latch sets are equalized and the run bit
    /// is set.
    ///
    /// # Errors
    /// [`LoadProgramError::DoesNotFit`] when origin + length exceeds the
    /// memory size; nothing is loaded in that case.
    pub fn load(&mut self, image: &ProgramImage) -> Result<(), LoadProgramError> {
        let end = usize::from(image.origin) + image.words.len();
        if end > WORDS_IN_MEM {
            return Err(LoadProgramError::DoesNotFit {
                origin: image.origin,
                words: image.words.len(),
                capacity: WORDS_IN_MEM,
            });
        }
        self.memory.load(image.origin, &image.words);
        if self.current.pc == 0 {
            self.current.pc = image.origin;
        }
        self.current.force_condition(ConditionFlag::Zero);
        self.next = self.current;
        self.run_bit = true;
        debug!(
            origin = image.origin,
            words = image.words.len(),
            "program loaded"
        );
        Ok(())
    }

    /// Executes exactly one instruction: fetch at the current PC, decode,
    /// execute against the current latches into the next latches, commit,
    /// count.
    ///
    /// # Errors
    /// A faulting cycle commits nothing and does not count; the last
    /// committed state stays inspectable.
    pub fn cycle(&mut self) -> Result<(), ExecutionError> {
        let word = self.memory.read(self.current.pc)?;
        let instruction = Instruction::from(word);
        trace!(pc = self.current.pc, ?instruction, "cycle");
        self.next = self.current;
        self.next.pc = self.current.pc.wrapping_add(1);
        execute(instruction, &self.current, &mut self.next, &mut self.memory)?;
        self.current = self.next;
        self.instruction_count += 1;
        Ok(())
    }

    /// Runs until the halt sentinel or, with `Some(n)`, for at most `n`
    /// cycles.
    ///
    /// The halt check happens before each cycle, so a program that TRAPped
    /// at the end of a bounded run halts on the following call.
    ///
    /// # Errors
    /// The first faulting cycle aborts the run; the simulator stays
    /// inspectable at its last committed state.
    pub fn run(&mut self, limit: Option<u64>) -> Result<RunOutcome, ExecutionError> {
        if !self.run_bit {
            return Ok(RunOutcome::AlreadyHalted);
        }
        let mut executed = 0;
        loop {
            if self.current.pc == HALT_ADDRESS {
                self.run_bit = false;
                debug!(executed, "simulator halted");
                return Ok(RunOutcome::Halted { executed });
            }
            if limit.is_some_and(|limit| executed >= limit) {
                return Ok(RunOutcome::LimitReached { executed });
            }
            self.cycle()?;
            executed += 1;
        }
    }

    pub const fn pc(&self) -> u16 {
        self.current.pc
    }

    pub const fn condition(&self) -> ConditionFlag {
        self.current.condition()
    }

    pub const fn registers(&self) -> &[u16; 8] {
        self.current.registers()
    }

    pub const fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// True between a successful load and the halt detected by [`Self::run`].
    pub const fn is_running(&self) -> bool {
        self.run_bit
    }

    /// Non-mutating memory access for dump and debug tooling.
    ///
    /// # Errors
    /// [`ExecutionError::OutOfBounds`] above the last backed address.
    pub fn read_memory(&self, address: u16) -> Result<u16, ExecutionError> {
        self.memory.read(address)
    }

    /// Writes the `mdump` block for `low..=high` inclusive. Addresses above
    /// the last backed word are omitted.
    ///
    /// # Errors
    /// Only I/O errors of the target writer.
    pub fn dump_memory(&self, out: &mut impl Write, low: u16, high: u16) -> io::Result<()> {
        writeln!(out, "\nMemory content [{low:#06x}..{high:#06x}] :")?;
        writeln!(out, "-------------------------------------")?;
        for address in low..=high.min(LAST_ADDRESS) {
            // clamped to the backed range, the read cannot fail
            if let Ok(value) = self.memory.read(address) {
                writeln!(out, "  {address:#06x} ({address}) : {value:#06x}")?;
            }
        }
        writeln!(out)
    }

    /// Writes the `rdump` block: instruction count, PC, condition codes and
    /// R0..R7.
    ///
    /// # Errors
    /// Only I/O errors of the target writer.
    pub fn dump_registers(&self, out: &mut impl Write) -> io::Result<()> {
        let (n, z, p) = self.current.condition().bits();
        writeln!(out, "\nCurrent register/bus values :")?;
        writeln!(out, "-------------------------------------")?;
        writeln!(out, "Instruction Count : {}", self.instruction_count)?;
        writeln!(out, "PC                : {:#06x}", self.current.pc)?;
        writeln!(out, "CCs: N = {n}  Z = {z}  P = {p}")?;
        writeln!(out, "Registers:")?;
        for (index, value) in self.current.registers().iter().enumerate() {
            writeln!(out, "{index}: {value:#06x}")?;
        }
        writeln!(out)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    const ORIGIN: u16 = 0x3000;

    fn loaded(words: &[u16]) -> Simulator {
        let mut simulator = Simulator::new();
        simulator
            .load(&ProgramImage {
                origin: ORIGIN,
                words: words.to_vec(),
            })
            .expect("image fits");
        simulator
    }

    #[gtest]
    fn load_sets_up_the_initial_state() {
        let simulator = loaded(&[0x1021]);
        expect_that!(simulator.pc(), eq(ORIGIN));
        expect_that!(simulator.condition(), eq(ConditionFlag::Zero));
        expect_that!(*simulator.registers(), eq([0u16; 8]));
        expect_that!(simulator.is_running(), eq(true));
        expect_that!(simulator.instruction_count(), eq(0));
        expect_that!(simulator.read_memory(ORIGIN), ok(eq(0x1021)));
    }

    #[gtest]
    fn first_image_wins_the_program_counter() {
        let mut simulator = loaded(&[0x1021]);
        simulator
            .load(&ProgramImage {
                origin: 0x4000,
                words: vec![0xF025],
            })
            .unwrap();
        expect_that!(simulator.pc(), eq(ORIGIN));
        expect_that!(simulator.read_memory(0x4000), ok(eq(0xF025)));
    }

    #[gtest]
    fn load_rejects_an_image_that_does_not_fit() {
        let mut simulator = Simulator::new();
        let result = simulator.load(&ProgramImage {
            origin: 0x7FFF,
            words: vec![0, 0],
        });
        expect_that!(
            result,
            err(matches_pattern!(LoadProgramError::DoesNotFit {
                origin: eq(&0x7FFF),
                words: eq(&2),
                capacity: eq(&WORDS_IN_MEM),
            }))
        );
        expect_that!(simulator.is_running(), eq(false));
    }

    #[gtest]
    fn lea_add_branch_halt_scenario() {
        // LEA R0, #1; ADD R0, R0, #1; BRnzp #0; TRAP x25
        let mut simulator = loaded(&[
            0b1110_000_000000001,
            0b0001_000_000_1_00001,
            0b0000_111_000000000,
            0xF025,
        ]);
        simulator.cycle().unwrap();
        expect_that!(simulator.registers()[0], eq(ORIGIN + 2));
        // LEA left the forced Z flag alone
        expect_that!(simulator.condition(), eq(ConditionFlag::Zero));
        simulator.cycle().unwrap();
        expect_that!(simulator.registers()[0], eq(ORIGIN + 3));
        expect_that!(simulator.condition(), eq(ConditionFlag::Pos));

        let outcome = simulator.run(None).unwrap();
        expect_that!(outcome, eq(RunOutcome::Halted { executed: 2 }));
        expect_that!(simulator.pc(), eq(HALT_ADDRESS));
        expect_that!(simulator.is_running(), eq(false));
        expect_that!(simulator.instruction_count(), eq(4));
    }

    #[gtest]
    fn run_with_a_limit_stops_early() {
        // four ADDs, then TRAP
        let mut simulator = loaded(&[0x1021, 0x1021, 0x1021, 0x1021, 0xF025]);
        let outcome = simulator.run(Some(3)).unwrap();
        expect_that!(outcome, eq(RunOutcome::LimitReached { executed: 3 }));
        expect_that!(simulator.registers()[0], eq(3));
        expect_that!(simulator.is_running(), eq(true));

        let outcome = simulator.run(None).unwrap();
        expect_that!(outcome, eq(RunOutcome::Halted { executed: 2 }));
        let outcome = simulator.run(None).unwrap();
        expect_that!(outcome, eq(RunOutcome::AlreadyHalted));
        expect_that!(simulator.instruction_count(), eq(5));
    }

    #[gtest]
    fn identical_state_produces_identical_cycles() {
        let program = [0b1110_001_000000101u16, 0x1021, 0x5020, 0xF025];
        let mut first = loaded(&program);
        let mut second = loaded(&program);
        while first.is_running() {
            first.run(Some(1)).unwrap();
            second.run(Some(1)).unwrap();
            expect_that!(first.pc(), eq(second.pc()));
            expect_that!(*first.registers(), eq(*second.registers()));
            expect_that!(first.condition(), eq(second.condition()));
        }
    }

    #[gtest]
    fn faulting_cycle_commits_nothing() {
        let mut simulator = loaded(&[0xD000, 0xF025]);
        let pc_before = simulator.pc();
        let count_before = simulator.instruction_count();
        let result = simulator.cycle();
        expect_that!(
            result,
            err(eq(ExecutionError::ReservedOpcode {
                pc: pc_before,
                word: 0xD000
            }))
        );
        expect_that!(simulator.pc(), eq(pc_before));
        expect_that!(simulator.instruction_count(), eq(count_before));
        // the run loop surfaces the same fault and stays inspectable
        let result = simulator.run(None);
        expect_that!(result, err(anything()));
        expect_that!(simulator.pc(), eq(pc_before));
    }

    #[gtest]
    fn out_of_bounds_store_aborts_the_run() {
        // NOT R6, R6 makes 0xFFFF; STR R0, R6, #0 then faults
        let mut simulator = loaded(&[0b1001_110_110_111111, 0b0111_000_110_000000, 0xF025]);
        let result = simulator.run(None);
        expect_that!(
            result,
            err(eq(ExecutionError::OutOfBounds { address: 0xFFFF }))
        );
        // the first cycle committed, the faulting one did not
        expect_that!(simulator.instruction_count(), eq(1));
        expect_that!(simulator.pc(), eq(ORIGIN + 1));
        expect_that!(simulator.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    fn dump_registers_formats_the_latch_set() {
        let mut simulator = loaded(&[0x1025, 0xF025]); // ADD R0, R0, #5
        simulator.cycle().unwrap();
        let mut out = Vec::new();
        simulator.dump_registers(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        expect_that!(text, contains_substring("Instruction Count : 1"));
        expect_that!(text, contains_substring("PC                : 0x3001"));
        expect_that!(text, contains_substring("CCs: N = 0  Z = 0  P = 1"));
        expect_that!(text, contains_substring("0: 0x0005"));
        expect_that!(text, contains_substring("7: 0x0000"));
    }

    #[gtest]
    fn dump_memory_clamps_to_the_backed_range() {
        let simulator = loaded(&[0xBEEF]);
        let mut out = Vec::new();
        simulator.dump_memory(&mut out, ORIGIN, 0xFFFF).unwrap();
        let text = String::from_utf8(out).unwrap();
        expect_that!(text, contains_substring("0x3000 (12288) : 0xbeef"));
        expect_that!(text, contains_substring("0x7fff"));
        expect_that!(text, not(contains_substring("0x8000 (")));
    }
}
