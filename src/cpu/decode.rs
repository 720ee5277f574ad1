//! Instruction decoding.
//!
//! An instruction word is `opcode * 100 + operand`: the hundreds digit
//! selects the operation and the low two digits are the operand, usually
//! an address.

use crate::decimal::Word;
use serde::{Serialize, Deserialize};

/// The ten machine operations.
///
/// Each variant is a handler the opcode registry can bind to an opcode
/// number. The discriminant is the canonical opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Input: read the next card into [operand]
    Inp = 0,
    /// Clear and add: ACC := [operand]
    Cla = 1,
    /// Add: ACC := ACC + [operand]
    Add = 2,
    /// Test accumulator: if ACC < 0 then PC := operand
    Tac = 3,
    /// Shift: left by the tens digit, then right by the ones digit
    Sft = 4,
    /// Output: append [operand] to the output
    Out = 5,
    /// Store: [operand] := ACC
    Sto = 6,
    /// Subtract: ACC := ACC - [operand]
    Sub = 7,
    /// Jump: [99] := 800 + PC, then PC := operand
    Jmp = 8,
    /// Halt and reset
    Hrs = 9,
}

impl Operation {
    /// All operations in opcode order.
    pub const ALL: [Operation; 10] = [
        Operation::Inp,
        Operation::Cla,
        Operation::Add,
        Operation::Tac,
        Operation::Sft,
        Operation::Out,
        Operation::Sto,
        Operation::Sub,
        Operation::Jmp,
        Operation::Hrs,
    ];

    /// The canonical opcode digit.
    #[inline]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Look up the operation canonically assigned to an opcode digit.
    pub fn from_opcode(opcode: i64) -> Option<Self> {
        usize::try_from(opcode)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Three-letter mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Operation::Inp => "INP",
            Operation::Cla => "CLA",
            Operation::Add => "ADD",
            Operation::Tac => "TAC",
            Operation::Sft => "SFT",
            Operation::Out => "OUT",
            Operation::Sto => "STO",
            Operation::Sub => "SUB",
            Operation::Jmp => "JMP",
            Operation::Hrs => "HRS",
        }
    }

    /// Parse a mnemonic (case-insensitive).
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionWord {
    /// Hundreds part of the word. Negative for negative words.
    pub opcode: i64,
    /// Low two digits.
    pub operand: u8,
}

/// Split a raw instruction word into opcode and operand.
///
/// Uses floor division, so `-42` decodes to opcode `-1`, operand `58`.
pub fn decode(ir: i64) -> InstructionWord {
    InstructionWord {
        opcode: ir.div_euclid(100),
        operand: ir.rem_euclid(100) as u8,
    }
}

/// Encode an operation and operand as a memory word.
///
/// Operands above 99 keep only their low two digits.
pub fn encode(op: Operation, operand: u8) -> Word {
    Word::from_i64(op.opcode() as i64 * 100 + (operand % 100) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_splits_digits() {
        assert_eq!(decode(206), InstructionWord { opcode: 2, operand: 6 });
        assert_eq!(decode(1), InstructionWord { opcode: 0, operand: 1 });
        assert_eq!(decode(999), InstructionWord { opcode: 9, operand: 99 });
    }

    #[test]
    fn test_decode_negative_word_floors() {
        assert_eq!(decode(-42), InstructionWord { opcode: -1, operand: 58 });
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(Operation::Add, 6).to_i64(), 206);
        assert_eq!(encode(Operation::Inp, 1).to_string(), "001");
        assert_eq!(encode(Operation::Jmp, 142).to_i64(), 842);
    }

    #[test]
    fn test_opcode_table() {
        for (i, op) in Operation::ALL.iter().enumerate() {
            assert_eq!(op.opcode() as usize, i);
            assert_eq!(Operation::from_opcode(i as i64), Some(*op));
            assert_eq!(Operation::from_mnemonic(op.mnemonic()), Some(*op));
        }
        assert_eq!(Operation::from_opcode(10), None);
        assert_eq!(Operation::from_opcode(-1), None);
        assert_eq!(Operation::from_mnemonic("sto"), Some(Operation::Sto));
        assert_eq!(Operation::from_mnemonic("MUL"), None);
    }
}
