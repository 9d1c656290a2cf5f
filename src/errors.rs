use std::io;

use thiserror::Error;

/// Everything that can go wrong before the first cycle executes.
///
/// Load errors are fatal at startup; the simulator never starts in a
/// partially-loaded state.
#[derive(Error, Debug)]
pub enum LoadProgramError {
    #[error("cannot read program image: {0}")]
    Io(#[from] io::Error),
    #[error("program image is empty, missing the origin address")]
    EmptyImage,
    #[error("invalid hex word '{token}' on line {line}")]
    InvalidWord { line: usize, token: String },
    #[error(
        "program of {words} words at origin {origin:#06x} does not fit into {capacity:#06x} words of memory"
    )]
    DoesNotFit {
        origin: u16,
        words: usize,
        capacity: usize,
    },
}

/// Faults raised while executing cycles.
///
/// A faulting cycle is never committed: the current run aborts and the last
/// committed state stays inspectable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("memory access out of bounds at address {address:#06x}")]
    OutOfBounds { address: u16 },
    #[error("reserved opcode word {word:#06x} at {pc:#06x}")]
    ReservedOpcode { pc: u16, word: u16 },
}
