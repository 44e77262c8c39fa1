use std::io;

use thiserror::Error;

/// Conditions the machine can't execute through.
///
/// A fault leaves the machine exactly as it was before the failing call.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("stack overflow: call at {pc:#06X} with every frame in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with no active frame")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read program")]
    Io(#[from] io::Error),
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        use Fault::*;
        match (self, other) {
            (StackOverflow { pc: a }, StackOverflow { pc: b }) => a == b,
            (StackUnderflow { pc: a }, StackUnderflow { pc: b }) => a == b,
            (MemoryOutOfBounds { address: a }, MemoryOutOfBounds { address: b }) => a == b,
            (ProgramTooLarge { size: a, max: m }, ProgramTooLarge { size: b, max: n }) => {
                a == b && m == n
            }
            (Io(a), Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
