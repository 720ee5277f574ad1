//! Accumulator shift arithmetic.
//!
//! The accumulator is four decimal digits wide for shifting purposes: a
//! left shift multiplies by ten and wraps modulo 10,000, a right shift
//! divides by ten rounding toward negative infinity.

/// Left shifts wrap at this modulus.
pub const ACC_MODULUS: i64 = 10_000;

/// Shift left by `count` digits, wrapping at four digits.
///
/// The result is always in `0..10_000`, including for negative inputs.
pub fn shift_left(acc: i64, count: u32) -> i64 {
    (0..count).fold(acc, |acc, _| (acc.rem_euclid(ACC_MODULUS) * 10).rem_euclid(ACC_MODULUS))
}

/// Shift right by `count` digits (floor division by ten per digit).
pub fn shift_right(acc: i64, count: u32) -> i64 {
    (0..count).fold(acc, |acc, _| acc.div_euclid(10))
}

/// Apply a shift operand: the tens digit is the left count, the ones digit
/// the right count. Left shifts happen first.
pub fn shift(acc: i64, operand: u8) -> i64 {
    let left = (operand / 10) as u32;
    let right = (operand % 10) as u32;
    shift_right(shift_left(acc, left), right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_left_wraps_at_four_digits() {
        assert_eq!(shift_left(1, 3), 1000);
        assert_eq!(shift_left(1, 4), 0);
        assert_eq!(shift_left(1234, 1), 2340);
    }

    #[test]
    fn test_shift_right_floors() {
        assert_eq!(shift_right(1234, 2), 12);
        assert_eq!(shift_right(5, 1), 0);
        assert_eq!(shift_right(-15, 1), -2);
        assert_eq!(shift_right(-1, 3), -1);
    }

    #[test]
    fn test_shift_left_of_negative_is_floor_mod() {
        // -5 * 10 = -50, and -50 mod 10000 = 9950
        assert_eq!(shift_left(-5, 1), 9950);
    }

    #[test]
    fn test_shift_operand_digits() {
        // 1 -> 10 -> 100, then 100 -> 10 -> 1 -> 0
        assert_eq!(shift(1, 23), 0);
        assert_eq!(shift(123, 10), 1230);
        assert_eq!(shift(123, 1), 12);
        assert_eq!(shift(4321, 0), 4321);
        // Drop the leading digit: shift out left, shift back right
        assert_eq!(shift(4321, 11), 321);
    }
}
