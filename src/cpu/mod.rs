//! Machine emulation.
//!
//! This module implements the complete decimal machine:
//! - 100 three-digit memory cells, cell 0 seeded with a card loader
//! - PC, IR and a single accumulator
//! - Ten opcodes assembled from capability groups into one registry
//! - A card-deck input queue and a printed output sequence

pub mod memory;
pub mod registers;
pub mod decode;
pub mod registry;
pub mod io;
pub mod execute;

pub use memory::{Cell, Memory, MemoryError, MEMORY_SIZE};
pub use registers::{RegisterSnapshot, Registers};
pub use decode::{decode, encode, InstructionWord, Operation};
pub use registry::{
    CapabilityGroup, ConfigurationError, GroupKind, HandlerEntry, OpcodeRegistry,
    ARITHMETIC, CONTROL, IO, STANDARD_GROUPS,
};
pub use io::{IoBoundary, LineProvider};
pub use execute::{CpuError, Executed, Machine, MachineState, RunOutcome, RunReport};
