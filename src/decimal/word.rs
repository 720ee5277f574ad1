//! Fixed-width signed decimal words.
//!
//! Every memory cell holds exactly three magnitude digits plus a sign.
//! Values wider than three digits are truncated to their low three digits
//! when converted, so `1234` becomes `234` and `-1000` becomes `-000`.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A signed three-digit decimal word.
///
/// The sign is kept separately from the magnitude so that the stored form
/// round-trips exactly: a truncated `-1000` is printed as `-000` even though
/// it reads back as zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WordRepr")]
pub struct Word {
    negative: bool,
    /// Always below [`Word::MODULUS`].
    magnitude: u16,
}

impl Word {
    /// Number of magnitude digits.
    pub const DIGITS: usize = 3;

    /// Magnitudes are kept modulo this value.
    pub const MODULUS: u64 = 1_000;

    /// Largest representable value.
    pub const MAX: i64 = 999;

    /// Smallest representable value.
    pub const MIN: i64 = -999;

    /// Create a zero word.
    #[inline]
    pub const fn zero() -> Self {
        Self { negative: false, magnitude: 0 }
    }

    /// Create a word from an integer, keeping only the low three digits.
    pub fn from_i64(value: i64) -> Self {
        Self {
            negative: value < 0,
            magnitude: (value.unsigned_abs() % Self::MODULUS) as u16,
        }
    }

    /// Convert to an integer.
    #[inline]
    pub fn to_i64(&self) -> i64 {
        let magnitude = self.magnitude as i64;
        if self.negative { -magnitude } else { magnitude }
    }

    /// The unsigned three-digit magnitude.
    #[inline]
    pub const fn magnitude(&self) -> u16 {
        self.magnitude
    }

    /// Whether the word carries a sign token.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if this word reads as zero (`000` or `-000`).
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.magnitude == 0
    }

    /// Parse a decimal token such as `"042"`, `"-7"` or `"+120"`.
    ///
    /// Surrounding whitespace is ignored. Tokens wider than three digits are
    /// truncated like any other write.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(ParseError::Empty),
        };

        if digits.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut magnitude: u64 = 0;
        let mut nonzero = false;
        for c in digits.chars() {
            let digit = c.to_digit(10).ok_or(ParseError::InvalidChar(c))?;
            nonzero |= digit != 0;
            magnitude = (magnitude * 10 + digit as u64) % Self::MODULUS;
        }

        Ok(Self {
            // "-0" is plain zero, "-1000" keeps its sign
            negative: negative && nonzero,
            magnitude: magnitude as u16,
        })
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.negative {
            format!("-{:03}", self.magnitude)
        } else {
            format!("{:03}", self.magnitude)
        };
        f.pad(&text)
    }
}

impl From<i64> for Word {
    fn from(value: i64) -> Self {
        Word::from_i64(value)
    }
}

impl std::str::FromStr for Word {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Word::parse(s)
    }
}

/// Serialized form of [`Word`], checked before it becomes one.
#[derive(Deserialize)]
struct WordRepr {
    negative: bool,
    magnitude: u16,
}

impl TryFrom<WordRepr> for Word {
    type Error = ParseError;

    fn try_from(repr: WordRepr) -> Result<Self, Self::Error> {
        if repr.magnitude as u64 >= Self::MODULUS {
            return Err(ParseError::TooWide(repr.magnitude));
        }
        Ok(Self { negative: repr.negative, magnitude: repr.magnitude })
    }
}

/// Errors from parsing a decimal token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty token")]
    Empty,

    #[error("invalid character in token: {0:?}")]
    InvalidChar(char),

    #[error("magnitude {0} has more than three digits")]
    TooWide(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(Word::from_i64(42).to_string(), "042");
        assert_eq!(Word::from_i64(-7).to_string(), "-007");
        assert_eq!(Word::from_i64(0).to_string(), "000");
        assert_eq!(Word::from_i64(999).to_string(), "999");
    }

    #[test]
    fn test_truncates_to_low_digits() {
        assert_eq!(Word::from_i64(1234).to_i64(), 234);
        assert_eq!(Word::from_i64(-5678).to_i64(), -678);
        assert_eq!(Word::from_i64(1000).to_string(), "000");
        assert_eq!(Word::from_i64(-1000).to_string(), "-000");
        assert_eq!(Word::from_i64(-1000).to_i64(), 0);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert_eq!(Word::from_i64(i64::MIN).to_string(), "-808");
        assert_eq!(Word::from_i64(i64::MAX).to_string(), "807");
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Word::parse("042").unwrap().to_i64(), 42);
        assert_eq!(Word::parse("-042").unwrap().to_i64(), -42);
        assert_eq!(Word::parse("+5").unwrap().to_i64(), 5);
        assert_eq!(Word::parse("  800 ").unwrap().to_i64(), 800);
        assert_eq!(Word::parse("12345").unwrap().to_i64(), 345);
        assert_eq!(Word::parse("-0").unwrap().to_string(), "000");
        assert_eq!(Word::parse("-1000").unwrap().to_string(), "-000");
    }

    #[test]
    fn test_deserialize_checks_magnitude() {
        let word: Word = serde_json::from_str(r#"{"negative":true,"magnitude":42}"#).unwrap();
        assert_eq!(word.to_string(), "-042");

        let wide = serde_json::from_str::<Word>(r#"{"negative":false,"magnitude":5000}"#);
        assert!(wide.is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Word::parse(""), Err(ParseError::Empty));
        assert_eq!(Word::parse("-"), Err(ParseError::Empty));
        assert_eq!(Word::parse("4x2"), Err(ParseError::InvalidChar('x')));
        assert_eq!(Word::parse("--1"), Err(ParseError::InvalidChar('-')));
    }
}
