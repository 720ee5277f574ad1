//! Memory bank.
//!
//! 100 decimal cells addressed 0-99. Cells start out blank except cell 0,
//! which holds the bootstrap instruction `001` (read one card into cell 1).

use crate::decimal::Word;
use serde::{Serialize, Deserialize};

/// The number of memory cells.
pub const MEMORY_SIZE: usize = 100;

/// Instruction seeded into cell 0 at reset: INP 01.
pub const BOOTSTRAP_WORD: i64 = 1;

/// One memory cell: either never written, or holding a word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Never written since reset. Reads as zero.
    #[default]
    Blank,
    /// A stored three-digit word.
    Word(Word),
}

impl Cell {
    /// The word this cell reads as. Blank cells read as zero.
    pub fn word(&self) -> Word {
        match self {
            Cell::Blank => Word::zero(),
            Cell::Word(w) => *w,
        }
    }

    /// Whether this cell has never been written.
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Blank => f.pad("   "),
            Cell::Word(w) => f.pad(&w.to_string()),
        }
    }
}

/// Machine memory: 100 decimal cells.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "MemoryRepr")]
pub struct Memory {
    cells: Vec<Cell>,
}

/// Serialized form of [`Memory`]; must hold exactly `MEMORY_SIZE` cells.
#[derive(Deserialize)]
struct MemoryRepr {
    cells: Vec<Cell>,
}

impl TryFrom<MemoryRepr> for Memory {
    type Error = MemoryError;

    fn try_from(repr: MemoryRepr) -> Result<Self, Self::Error> {
        if repr.cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(repr.cells.len()));
        }
        Ok(Self { cells: repr.cells })
    }
}

impl Memory {
    /// Create memory in its reset image.
    pub fn new() -> Self {
        let mut cells = vec![Cell::Blank; MEMORY_SIZE];
        cells[0] = Cell::Word(Word::from_i64(BOOTSTRAP_WORD));
        Self { cells }
    }

    /// Validate an address and return it as an index.
    #[inline]
    pub fn check_addr(addr: usize) -> Result<usize, MemoryError> {
        if addr >= MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfRange(addr));
        }
        Ok(addr)
    }

    /// Read a cell as an integer. Blank cells read as 0.
    pub fn read(&self, addr: usize) -> Result<i64, MemoryError> {
        Ok(self.read_word(addr)?.to_i64())
    }

    /// Read a cell as a word. Blank cells read as `000`.
    pub fn read_word(&self, addr: usize) -> Result<Word, MemoryError> {
        Ok(self.cell(addr)?.word())
    }

    /// Get the raw cell, distinguishing blank cells from stored zeros.
    pub fn cell(&self, addr: usize) -> Result<Cell, MemoryError> {
        let index = Self::check_addr(addr)?;
        Ok(self.cells[index])
    }

    /// Write an integer, truncating it to three digits.
    pub fn write(&mut self, addr: usize, value: i64) -> Result<(), MemoryError> {
        self.write_word(addr, Word::from_i64(value))
    }

    /// Write a word.
    pub fn write_word(&mut self, addr: usize, value: Word) -> Result<(), MemoryError> {
        let index = Self::check_addr(addr)?;
        self.cells[index] = Cell::Word(value);
        Ok(())
    }

    /// Restore the reset image.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Place words directly into memory starting at `start_addr`.
    ///
    /// This bypasses the card loader; it is meant for hosts and tests that
    /// want a ready-made memory image.
    pub fn load_program(&mut self, start_addr: usize, program: &[Word]) -> Result<(), MemoryError> {
        let available = MEMORY_SIZE.saturating_sub(start_addr);
        if program.len() > available {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available,
            });
        }

        for (i, &word) in program.iter().enumerate() {
            self.cells[start_addr + i] = Cell::Word(word);
        }

        Ok(())
    }

    /// Dump memory contents (for viewers).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, Cell)> {
        let end = start.saturating_add(count).min(MEMORY_SIZE);
        (start.min(end)..end)
            .map(|i| (i, self.cells[i]))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let written = self.cells.iter().filter(|cell| !cell.is_blank()).count();

        f.debug_struct("Memory")
            .field("written_cells", &written)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    AddressOutOfRange(usize),
    /// Program is too large to fit in memory.
    ProgramTooLarge { size: usize, available: usize },
    /// Memory image does not have exactly `MEMORY_SIZE` cells.
    WrongSize(usize),
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::AddressOutOfRange(addr) => {
                write!(f, "memory address {} out of range (0 to {})", addr, MEMORY_SIZE - 1)
            }
            MemoryError::ProgramTooLarge { size, available } => {
                write!(f, "program size {} exceeds available space {}", size, available)
            }
            MemoryError::WrongSize(len) => {
                write!(f, "memory image has {} cells, expected {}", len, MEMORY_SIZE)
            }
        }
    }
}

impl std::error::Error for MemoryError {}
