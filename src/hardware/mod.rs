//! The physical machine parts: flat word-addressed memory and the
//! architectural latch set.

pub mod latches;
pub mod memory;
