//! # LC-3 instruction-level simulator.
//!
//! `lc3-isim` models a minimal 16-bit von Neumann machine: eight general
//! purpose registers, a flat word-addressed memory of 0x8000 words, one-hot
//! N/Z/P condition codes and the 16-opcode LC-3 instruction set. The engine
//! interprets one machine word per cycle against a double-buffered latch
//! set and commits the result atomically.
//!
//! Usage starts with parsing an [`image::ProgramImage`] and loading it into
//! a [`simulator::Simulator`].
//!
//! # Example
//! ```
//! use lc3_isim::image::ProgramImage;
//! use lc3_isim::simulator::{RunOutcome, Simulator};
//!
//! // ADD R0, R0, #1 then TRAP, loaded at 0x3000
//! let image: ProgramImage = "3000\n1021\nF025".parse().unwrap();
//! let mut simulator = Simulator::new();
//! simulator.load(&image).unwrap();
//! let outcome = simulator.run(None).unwrap();
//! assert_eq!(outcome, RunOutcome::Halted { executed: 2 });
//! assert_eq!(simulator.registers()[0], 1);
//! ```
//!
//! # Errors
//! - Load-time problems (unreadable file, bad hex token, image that does
//!   not fit) surface as [`errors::LoadProgramError`] before any cycle runs.
//! - Mid-run faults (out-of-bounds access, the reserved 0xD opcode) surface
//!   as [`errors::ExecutionError`]; the faulting cycle is never committed.

pub mod command;
pub mod errors;
pub mod hardware;
pub mod image;
pub mod numbers;
pub mod simulator;
