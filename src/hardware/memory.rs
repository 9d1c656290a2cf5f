use std::fmt::{Debug, Formatter};

use crate::errors::ExecutionError;

/// Highest backed memory address.
pub const LAST_ADDRESS: u16 = 0x7FFF;
/// Number of addressable 16-bit words.
pub const WORDS_IN_MEM: usize = LAST_ADDRESS as usize + 1;

/// Flat word-addressed main memory.
///
/// Addresses are 16 bit wide but only `0..WORDS_IN_MEM` is backed. Accesses
/// above [`LAST_ADDRESS`] are rejected as [`ExecutionError::OutOfBounds`]
/// instead of wrapping or corrupting a neighbour.
pub struct Memory {
    /// Index equals memory address
    data: Vec<u16>,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0u16; WORDS_IN_MEM],
        }
    }

    /// Reads one word.
    ///
    /// # Errors
    /// [`ExecutionError::OutOfBounds`] above [`LAST_ADDRESS`].
    pub fn read(&self, address: u16) -> Result<u16, ExecutionError> {
        self.data
            .get(usize::from(address))
            .copied()
            .ok_or(ExecutionError::OutOfBounds { address })
    }

    /// Writes one word.
    ///
    /// # Errors
    /// [`ExecutionError::OutOfBounds`] above [`LAST_ADDRESS`]; nothing is
    /// written in that case.
    pub fn write(&mut self, address: u16, value: u16) -> Result<(), ExecutionError> {
        match self.data.get_mut(usize::from(address)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(ExecutionError::OutOfBounds { address }),
        }
    }

    /// Copies a program's words starting at its origin. The caller validates
    /// the fit beforehand.
    pub(crate) fn load(&mut self, origin: u16, words: &[u16]) {
        let start = usize::from(origin);
        self.data[start..start + words.len()].copy_from_slice(words);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory({WORDS_IN_MEM:#06x} words)")
    }
}
