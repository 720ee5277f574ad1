//! Assembler, disassembler and card decks.
//!
//! This module provides:
//! - A two-pass assembler (source text → program image → self-loading deck)
//! - A disassembler (words, memory listings and decks → readable text)
//! - The deck file format

pub mod assembler;
pub mod disasm;
pub mod deck;

pub use assembler::{assemble, AssemblerError, Program};
pub use disasm::{disassemble, disassemble_deck, disassemble_word};
pub use deck::{Deck, DeckError, load_deck, parse_deck, save_deck};
