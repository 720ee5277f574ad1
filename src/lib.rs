//! # von Neumann Emulator
//!
//! An emulator of a decimal, single-accumulator stored-program computer.
//!
//! The machine has 100 three-digit memory cells, ten opcodes, a card-deck
//! input queue and a printed output. Cell 0 holds a one-instruction card
//! loader, so a whole program is fed in as a deck of cards.

pub mod decimal;
pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use decimal::Word;
pub use cpu::{
    Cell, CpuError, ConfigurationError, Machine, MachineState, Memory, Operation, Registers,
    RunOutcome, RunReport,
};
pub use asm::{assemble, AssemblerError, Deck, Program, load_deck, save_deck};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
