//! Machine registers.
//!
//! The machine has three registers and a control flag:
//! - PC: program counter (address of the next instruction, 0-99)
//! - IR: instruction register (last fetched word)
//! - ACC: accumulator
//! - running: cleared only by HRS or an external stop

use crate::cpu::memory::{MemoryError, MEMORY_SIZE};
use serde::{Serialize, Deserialize};

/// The register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// Program counter.
    pub pc: usize,

    /// Instruction register. Signed because a negative memory word can be
    /// fetched as an instruction; it then decodes to an invalid opcode.
    pub ir: i64,

    /// Accumulator.
    pub acc: i64,

    /// Run/halt flag.
    pub running: bool,
}

impl Registers {
    /// Create a register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero and clear the running flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Increment the program counter by 1.
    /// Returns the old value.
    ///
    /// Fails without moving PC if the increment would leave memory.
    pub fn advance_pc(&mut self) -> Result<usize, MemoryError> {
        let old = self.pc;
        let next = old + 1;
        if next >= MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfRange(next));
        }
        self.pc = next;
        Ok(old)
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: usize) {
        self.pc = addr;
    }

    /// Copy out PC, IR and ACC for display.
    pub fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            pc: self.pc,
            ir: self.ir,
            acc: self.acc,
        }
    }
}

/// A point-in-time copy of the visible registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    pub pc: usize,
    pub ir: i64,
    pub acc: i64,
}

impl std::fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IR: {}\tPC: {}\tACC: {}", self.ir, self.pc, self.acc)
    }
}
