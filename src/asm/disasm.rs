//! Disassembler.
//!
//! Turns memory words and deck cards back into readable assembly.

use crate::asm::deck::Deck;
use crate::cpu::decode::{decode, Operation};
use crate::cpu::memory::Cell;
use crate::decimal::Word;

/// Disassemble a single word to text.
pub fn disassemble_word(word: Word) -> String {
    let decoded = decode(word.to_i64());
    match Operation::from_opcode(decoded.opcode) {
        Some(Operation::Hrs) if decoded.operand == 0 => "HRS".to_string(),
        Some(op) if !word.is_negative() => format!("{} {:02}", op, decoded.operand),
        _ => format!("??? ; {}", word),
    }
}

/// Disassemble a cell; blank cells show as empty.
pub fn disassemble_cell(cell: Cell) -> String {
    match cell {
        Cell::Blank => String::new(),
        Cell::Word(word) => disassemble_word(word),
    }
}

/// Disassemble a memory listing.
pub fn disassemble(cells: &[(usize, Cell)]) -> String {
    let mut output = String::new();
    output.push_str("; Memory Disassembly\n");
    output.push_str("; ------------------\n\n");

    for &(addr, cell) in cells {
        if cell.is_blank() {
            continue;
        }
        output.push_str(&format!("{:02}: {:>4}  {}\n", addr, cell, disassemble_cell(cell)));
    }

    output
}

/// Annotate every card of a deck with its disassembly.
pub fn disassemble_deck(deck: &Deck) -> String {
    let mut output = String::new();
    for (i, token) in deck.tokens().iter().enumerate() {
        let text = match Word::parse(token) {
            Ok(word) => disassemble_word(word),
            Err(e) => format!("??? ; {}", e),
        };
        output.push_str(&format!("{:03}: {:>4}  {}\n", i, token, text));
    }
    output
}
