//! Decimal number primitives for the machine.
//!
//! This module provides:
//! - [`Word`] - A signed three-digit memory word (-999 to +999)
//! - [`arith`] - Accumulator shift arithmetic (four-digit wraparound)

mod word;
pub mod arith;

pub use word::{Word, ParseError};
pub use arith::{shift, shift_left, shift_right};
