//! Simple assembler for card-deck programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//!         ORG 10          ; Set origin address
//! START:  INP VALUE       ; Read a card into VALUE
//!         OUT VALUE       ; Print it
//!         HRS             ; Halt and reset
//! VALUE:  DAT 0           ; Define data value
//!         ENTRY START     ; Where the loader jumps when done
//! ```
//!
//! The result is a [`Program`]: an address-to-word image plus an entry
//! point, which [`Program::to_deck`] turns into a self-loading deck.

use crate::asm::deck::Deck;
use crate::cpu::decode::{encode, Operation};
use crate::decimal::Word;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Lowest address a program may occupy. Cells 0-2 run the card loader.
pub const FIRST_PROGRAM_ADDR: i64 = 3;

/// Highest address a program may occupy. Cell 99 holds JMP return words.
pub const LAST_PROGRAM_ADDR: i64 = 98;

/// First two cards of every deck: put `INP 02` in cell 1, then `JMP 00`
/// in cell 2, turning cells 0-2 into a load-address/value loop.
pub const LOADER_PRELUDE: [&str; 2] = ["002", "800"];

/// An assembled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Words by address.
    pub image: BTreeMap<usize, Word>,
    /// Address the loader jumps to after the last card.
    pub entry: usize,
}

impl Program {
    /// Build a self-loading deck: loader prelude, one address/value card
    /// pair per word, the jump to `entry`, then the program's input cards.
    pub fn to_deck<I, S>(&self, inputs: I) -> Deck
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deck = Deck::new();
        for card in LOADER_PRELUDE {
            deck.push(card);
        }
        for (&addr, word) in &self.image {
            deck.push(encode(Operation::Inp, addr as u8).to_string());
            deck.push(word.to_string());
        }
        deck.push(encode(Operation::Jmp, self.entry as u8).to_string());
        for input in inputs {
            deck.push(input);
        }
        deck
    }

    /// Words in address order.
    pub fn words(&self) -> impl Iterator<Item = (usize, Word)> + '_ {
        self.image.iter().map(|(&addr, &word)| (addr, word))
    }
}

/// Assemble source code to a program.
pub fn assemble(source: &str) -> Result<Program, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// A use of a label waiting for pass 2.
struct Pending {
    addr: usize,
    /// `None` for DAT.
    op: Option<Operation>,
    label: String,
    line: usize,
}

/// The assembler state.
struct Assembler {
    /// Current address (origin).
    current_addr: i64,
    /// Symbol table (label -> address).
    symbols: HashMap<String, i64>,
    /// Forward references.
    pending: Vec<Pending>,
    /// Output words.
    image: BTreeMap<usize, Word>,
    /// Explicit ENTRY operand, resolved after pass 1.
    entry: Option<(String, usize)>,
    /// Address of the first emitted word.
    first_addr: Option<usize>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            current_addr: FIRST_PROGRAM_ADDR,
            symbols: HashMap::new(),
            pending: Vec::new(),
            image: BTreeMap::new(),
            entry: None,
            first_addr: None,
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Program, AssemblerError> {
        // Pass 1: collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Pass 2: resolve forward references
        self.resolve_references()?;

        let entry = match &self.entry {
            Some((operand, line)) => {
                let addr = self.resolve_value(operand, *line)?;
                Self::check_program_addr(addr, *line)?
            }
            None => self.first_addr.ok_or(AssemblerError::EmptyProgram)?,
        };

        Ok(Program { image: std::mem::take(&mut self.image), entry })
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments
        let line = match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: format!("invalid label {:?}", label),
                });
            }
            if self.symbols.insert(label.clone(), self.current_addr).is_some() {
                return Err(AssemblerError::DuplicateLabel { line: line_num, label });
            }

            let rest = line[colon_idx + 1..].trim();
            if !rest.is_empty() {
                return self.process_instruction(rest, line_num);
            }
            return Ok(());
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (mnemonic, operand) = match parts.as_slice() {
            [] => return Ok(()),
            [m] => (m.to_uppercase(), None),
            [m, op] => (m.to_uppercase(), Some(*op)),
            _ => {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: "too many operands".into(),
                })
            }
        };

        match mnemonic.as_str() {
            // Directives
            "ORG" => {
                let operand = Self::require(operand, "ORG requires address", line_num)?;
                let addr = Self::parse_number(operand).ok_or_else(|| AssemblerError::SyntaxError {
                    line: line_num,
                    message: "ORG requires a numeric address".into(),
                })?;
                Self::check_program_addr(addr, line_num)?;
                self.current_addr = addr;
            }

            "DAT" | "DATA" => {
                let operand = Self::require(operand, "DAT requires value", line_num)?;
                let value = match Self::parse_number(operand) {
                    Some(value) => value,
                    None => {
                        self.defer(None, operand, line_num)?;
                        0
                    }
                };
                if !(Word::MIN..=Word::MAX).contains(&value) {
                    return Err(AssemblerError::ValueOutOfRange { line: line_num, value });
                }
                self.emit(Word::from_i64(value), line_num)?;
            }

            "ENTRY" => {
                let operand = Self::require(operand, "ENTRY requires address", line_num)?;
                self.entry = Some((operand.to_uppercase(), line_num));
            }

            // Instructions
            _ => {
                let op = Operation::from_mnemonic(&mnemonic).ok_or_else(|| {
                    AssemblerError::UnknownMnemonic { line: line_num, mnemonic: mnemonic.clone() }
                })?;
                let target = match operand {
                    Some(operand) => match Self::parse_number(operand) {
                        Some(value) => value,
                        None => {
                            self.defer(Some(op), operand, line_num)?;
                            0
                        }
                    },
                    // Only HRS reads naturally without an operand
                    None if op == Operation::Hrs => 0,
                    None => {
                        return Err(AssemblerError::SyntaxError {
                            line: line_num,
                            message: format!("{} requires an operand", op),
                        })
                    }
                };
                let operand = Self::check_operand(target, line_num)?;
                self.emit(encode(op, operand), line_num)?;
            }
        }

        Ok(())
    }

    fn require<'a>(operand: Option<&'a str>, message: &str, line: usize) -> Result<&'a str, AssemblerError> {
        operand.ok_or_else(|| AssemblerError::SyntaxError { line, message: message.into() })
    }

    fn parse_number(operand: &str) -> Option<i64> {
        operand.parse::<i64>().ok()
    }

    fn check_operand(value: i64, line: usize) -> Result<u8, AssemblerError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v < 100)
            .ok_or(AssemblerError::ValueOutOfRange { line, value })
    }

    fn check_program_addr(addr: i64, line: usize) -> Result<usize, AssemblerError> {
        if !(FIRST_PROGRAM_ADDR..=LAST_PROGRAM_ADDR).contains(&addr) {
            return Err(AssemblerError::AddressOutOfRange { line, addr });
        }
        Ok(addr as usize)
    }

    /// Record a label use at the current address.
    fn defer(&mut self, op: Option<Operation>, label: &str, line: usize) -> Result<(), AssemblerError> {
        let addr = Self::check_program_addr(self.current_addr, line)?;
        self.pending.push(Pending { addr, op, label: label.to_uppercase(), line });
        Ok(())
    }

    fn emit(&mut self, word: Word, line: usize) -> Result<(), AssemblerError> {
        let addr = Self::check_program_addr(self.current_addr, line)?;
        if self.image.insert(addr, word).is_some() {
            return Err(AssemblerError::Overlap { line, addr });
        }
        self.first_addr.get_or_insert(addr);
        self.current_addr += 1;
        Ok(())
    }

    fn resolve_value(&self, operand: &str, line: usize) -> Result<i64, AssemblerError> {
        if let Some(value) = Self::parse_number(operand) {
            return Ok(value);
        }
        self.symbols
            .get(&operand.to_uppercase())
            .copied()
            .ok_or_else(|| AssemblerError::UndefinedLabel { line, label: operand.to_string() })
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for pending in &self.pending {
            let target = self.resolve_value(&pending.label, pending.line)?;
            let word = match pending.op {
                Some(op) => encode(op, Self::check_operand(target, pending.line)?),
                None => Word::from_i64(target),
            };
            self.image.insert(pending.addr, word);
        }
        Ok(())
    }
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("label defined twice on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: i64 },

    #[error("address out of range on line {line}: {addr} (programs live in 3-98)")]
    AddressOutOfRange { line: usize, addr: i64 },

    #[error("address {addr} assembled twice (line {line})")]
    Overlap { line: usize, addr: usize },

    #[error("program is empty")]
    EmptyProgram,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_simple() {
        let source = r#"
            ; Simple test program
            ORG 10
            CLA 20
            ADD 21
            STO 22
            HRS
        "#;

        let program = assemble(source).unwrap();
        let words: Vec<(usize, i64)> = program.words().map(|(a, w)| (a, w.to_i64())).collect();
        assert_eq!(words, vec![(10, 120), (11, 221), (12, 622), (13, 900)]);
        assert_eq!(program.entry, 10);
    }

    #[test]
    fn test_assemble_with_labels() {
        let source = r#"
                ORG 20
        LOOP:   CLA COUNT
                TAC DONE
                JMP LOOP
        DONE:   HRS
        COUNT:  DAT -3
        "#;

        let program = assemble(source).unwrap();
        assert_eq!(program.image[&20].to_i64(), 124);
        assert_eq!(program.image[&21].to_i64(), 323);
        assert_eq!(program.image[&22].to_i64(), 820);
        assert_eq!(program.image[&24].to_string(), "-003");
    }

    #[test]
    fn test_entry_directive() {
        let source = r#"
                ORG 10
        X:      DAT 5
        START:  OUT X
                HRS
                ENTRY START
        "#;

        let program = assemble(source).unwrap();
        assert_eq!(program.entry, 11);
    }

    #[test]
    fn test_label_as_data() {
        let program = assemble("ORG 40\nPTR: DAT PTR").unwrap();
        assert_eq!(program.image[&40].to_i64(), 40);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            assemble("MUL 10"),
            Err(AssemblerError::UnknownMnemonic { line: 1, .. })
        ));
        assert!(matches!(
            assemble("JMP NOWHERE"),
            Err(AssemblerError::UndefinedLabel { line: 1, .. })
        ));
        assert!(matches!(
            assemble("CLA 100"),
            Err(AssemblerError::ValueOutOfRange { line: 1, value: 100 })
        ));
        assert!(matches!(
            assemble("ORG 1"),
            Err(AssemblerError::AddressOutOfRange { line: 1, addr: 1 })
        ));
        assert!(matches!(
            assemble("ADD"),
            Err(AssemblerError::SyntaxError { line: 1, .. })
        ));
        assert!(matches!(
            assemble("A: HRS\nA: HRS"),
            Err(AssemblerError::DuplicateLabel { line: 2, .. })
        ));
        assert!(matches!(
            assemble("ORG 10\nHRS\nORG 10\nHRS"),
            Err(AssemblerError::Overlap { line: 4, addr: 10 })
        ));
        assert_eq!(assemble("; nothing"), Err(AssemblerError::EmptyProgram));
    }

    #[test]
    fn test_to_deck_uses_loader() {
        let program = assemble("ORG 10\nINP 20\nOUT 20\nHRS").unwrap();
        let deck = program.to_deck(["042"]);
        assert_eq!(
            deck.tokens(),
            ["002", "800", "010", "020", "011", "520", "012", "900", "810", "042"]
        );
    }
}
