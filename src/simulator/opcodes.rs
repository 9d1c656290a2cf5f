//! The sixteen-way opcode dispatch of the LC-3.
//!
//! Every handler reads only the current latches (plus memory) and writes
//! only the next latches (plus memory). `next` arrives seeded as a copy of
//! `current` with the program counter already advanced past the fetched
//! word, so a handler overrides exactly what its opcode changes.

use crate::errors::ExecutionError;
use crate::hardware::latches::Latches;
use crate::hardware::memory::Memory;
use crate::numbers::{add16, sign_extend};
use crate::simulator::instruction::Instruction;

/// The implemented LC-3 opcodes by their 4-bit encoding.
///
/// 0xD is the ISA's reserved encoding and deliberately not a variant:
/// [`Opcode::n`] maps it to `None` and [`execute`] fails fast on it instead
/// of guessing a meaning.
#[repr(u16)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    Br = 0x0,
    Add = 0x1,
    Ld = 0x2,
    St = 0x3,
    Jsr = 0x4,
    And = 0x5,
    Ldr = 0x6,
    Str = 0x7,
    /// Return from interrupt; privilege levels are out of scope, so this
    /// commits as a plain no-op cycle.
    Rti = 0x8,
    Not = 0x9,
    Ldi = 0xA,
    Sti = 0xB,
    Jmp = 0xC,
    Lea = 0xE,
    /// Service routines are out of scope; TRAP only forces the program
    /// counter to the halt sentinel 0x0000.
    Trap = 0xF,
}

/// Applies one decoded instruction to `next`, reading `current`.
///
/// # Errors
/// - [`ExecutionError::OutOfBounds`] from any load or store, including the
///   inner access of LDI/STI.
/// - [`ExecutionError::ReservedOpcode`] for the 0xD encoding.
pub fn execute(
    i: Instruction,
    current: &Latches,
    next: &mut Latches,
    memory: &mut Memory,
) -> Result<(), ExecutionError> {
    let Some(opcode) = Opcode::n(i.opcode) else {
        return Err(ExecutionError::ReservedOpcode {
            pc: current.pc,
            word: i.raw,
        });
    };
    match opcode {
        Opcode::Br => br(i, current, next),
        Opcode::Add => add(i, current, next),
        Opcode::Ld => ld(i, next, memory)?,
        Opcode::St => st(i, current, next.pc, memory)?,
        Opcode::Jsr => jsr(i, current, next),
        Opcode::And => and(i, current, next),
        Opcode::Ldr => ldr(i, current, next, memory)?,
        Opcode::Str => str(i, current, memory)?,
        Opcode::Rti => (),
        Opcode::Not => not(i, current, next),
        Opcode::Ldi => ldi(i, next, memory)?,
        Opcode::Sti => sti(i, current, next.pc, memory)?,
        Opcode::Jmp => jmp_or_ret(i, current, next),
        Opcode::Lea => lea(i, next),
        Opcode::Trap => trap(next),
    }
    Ok(())
}

/// ADD: mathematical addition in 2 variants
/// - DR is set with result of SR 1 + SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0001 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 + sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0001 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
fn add(i: Instruction, current: &Latches, next: &mut Latches) {
    let (op2, width2) = if i.imm_mode {
        (i.imm5, 5)
    } else {
        (current.get(i.sr2), 16)
    };
    next.set(i.dr, add16(current.get(i.sr1), 16, op2, width2));
    next.update_condition(i.dr);
}

/// AND: bit-wise AND in 2 variants
/// - DR is set with result of SR 1 AND SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0101 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 AND sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0101 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
fn and(i: Instruction, current: &Latches, next: &mut Latches) {
    let op2 = if i.imm_mode {
        #[expect(
            clippy::cast_sign_loss,
            reason = "the 16-bit two's-complement pattern is the operand"
        )]
        let extended = sign_extend(i.imm5, 5) as u16;
        extended
    } else {
        current.get(i.sr2)
    };
    next.set(i.dr, current.get(i.sr1) & op2);
    next.update_condition(i.dr);
}

/// NOT: bit-wise complement of the value in SR 1
/// ```text
///  15__12__11_9__8_6___5___0_
/// | 1001 |  DR | SR1 | 11111 |
///  --------------------------
/// ```
fn not(i: Instruction, current: &Latches, next: &mut Latches) {
    next.set(i.dr, !current.get(i.sr1));
    next.update_condition(i.dr);
}

/// BR: conditional branch
/// ```text
///  15__12__11_9___8_______0_
/// | 0000 |  nzp | PCoffset9 |
///  -------------------------
/// ```
/// Branches only if the currently set condition flag is among the requested
/// `nzp` bits; with all three clear it never branches.
fn br(i: Instruction, current: &Latches, next: &mut Latches) {
    if current.condition().matches(i.n, i.z, i.p) {
        next.pc = add16(next.pc, 16, i.pcoffset9, 9);
    }
}

/// JSR: jump to sub-routine, two variants
/// - JSR to PC + `PCoffset11`
/// ```text
///  15__12__11_10_________0
/// | 0100 | 1 | PCoffset11 |
///  -----------------------
/// ```
/// - JSRR to location in `BaseR`
/// ```text
///  15__12__11_9__8___6___5____0_
/// | 0100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
/// The advanced PC is saved in R7; JSRR through R7 still reads the
/// current-state base first.
fn jsr(i: Instruction, current: &Latches, next: &mut Latches) {
    let return_address = next.pc;
    next.pc = if i.pc_relative {
        add16(return_address, 16, i.pcoffset11, 11)
    } else {
        current.get(i.sr1)
    };
    next.set(7, return_address);
}

/// JMP or RET: sets the PC to the value of register `BaseR`.
/// RET is the `BaseR` = 7 encoding, not a separate case.
/// ```text
///  15__12__11_9___8_6____5____0_
/// | 1100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
fn jmp_or_ret(i: Instruction, current: &Latches, next: &mut Latches) {
    next.pc = current.get(i.sr1);
}

/// LD: loads the word at PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 0010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
fn ld(i: Instruction, next: &mut Latches, memory: &Memory) -> Result<(), ExecutionError> {
    let address = add16(next.pc, 16, i.pcoffset9, 9);
    next.set(i.dr, memory.read(address)?);
    next.update_condition(i.dr);
    Ok(())
}

/// LDI: load indirect, through the pointer word at PC + sign extended
/// offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
fn ldi(i: Instruction, next: &mut Latches, memory: &Memory) -> Result<(), ExecutionError> {
    let pointer_address = add16(next.pc, 16, i.pcoffset9, 9);
    let value_address = memory.read(pointer_address)?;
    next.set(i.dr, memory.read(value_address)?);
    next.update_condition(i.dr);
    Ok(())
}

/// LDR: loads the word at `BaseR` + sign extended offset6 into DR.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0110 |  DR | BaseR | offset6 |
///  ------------------------------
/// ```
fn ldr(
    i: Instruction,
    current: &Latches,
    next: &mut Latches,
    memory: &Memory,
) -> Result<(), ExecutionError> {
    let address = add16(current.get(i.sr1), 16, i.offset6, 6);
    next.set(i.dr, memory.read(address)?);
    next.update_condition(i.dr);
    Ok(())
}

/// LEA: loads PC + sign extended offset itself into DR.
/// Unlike the other register writers it leaves the condition codes alone.
/// ```text
///  15__12__11_9___8_______0_
/// | 1110 |  DR  | PCoffset9 |
///  -------------------------
/// ```
fn lea(i: Instruction, next: &mut Latches) {
    next.set(i.dr, add16(next.pc, 16, i.pcoffset9, 9));
}

/// ST: stores SR to memory at PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 0011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
fn st(
    i: Instruction,
    current: &Latches,
    pc: u16,
    memory: &mut Memory,
) -> Result<(), ExecutionError> {
    let address = add16(pc, 16, i.pcoffset9, 9);
    memory.write(address, current.get(i.dr))
}

/// STI: store indirect, through the pointer word at PC + sign extended
/// offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
fn sti(
    i: Instruction,
    current: &Latches,
    pc: u16,
    memory: &mut Memory,
) -> Result<(), ExecutionError> {
    let pointer_address = add16(pc, 16, i.pcoffset9, 9);
    let store_address = memory.read(pointer_address)?;
    memory.write(store_address, current.get(i.dr))
}

/// STR: stores SR to memory at `BaseR` + sign extended offset6.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0111 |  SR | BaseR | offset6 |
///  ------------------------------
/// ```
fn str(i: Instruction, current: &Latches, memory: &mut Memory) -> Result<(), ExecutionError> {
    let address = add16(current.get(i.sr1), 16, i.offset6, 6);
    memory.write(address, current.get(i.dr))
}

/// TRAP: service routines are unimplemented by design; the PC is forced to
/// the halt sentinel and the run loop stops on its next check.
/// ```text
///  15__12__11__8___7______0_
/// | 1111 | 0000 | trapvect8 |
///  -------------------------
/// ```
const fn trap(next: &mut Latches) {
    next.pc = 0x0000;
}
