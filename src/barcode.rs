//! UPC-A barcode encoding.
//!
//! A UPC-A symbol carries 11 data digits and a trailing check digit. The first six
//! digits use the odd-parity L-code, the remaining five and the check digit use the
//! R-code, framed by the start, middle and end guards.

use std::str::FromStr;

use crate::error::CodeError;

/// Maximum number of data digits.
pub const MAX_DIGITS: usize = 11;

/// Number of bar units in a full symbol.
pub const SYMBOL_WIDTH: usize = 3 + 6 * 7 + 5 + 6 * 7 + 3;

/// Left-hand (odd parity) digit patterns.
const L_CODE: [[u8; 7]; 10] = [
    [0, 0, 0, 1, 1, 0, 1],
    [0, 0, 1, 1, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];

/// Right-hand digit patterns, the complement of [`L_CODE`].
const R_CODE: [[u8; 7]; 10] = [
    [1, 1, 1, 0, 0, 1, 0],
    [1, 1, 0, 0, 1, 1, 0],
    [1, 1, 0, 1, 1, 0, 0],
    [1, 0, 0, 0, 0, 1, 0],
    [1, 0, 1, 1, 1, 0, 0],
    [1, 0, 0, 1, 1, 1, 0],
    [1, 0, 1, 0, 0, 0, 0],
    [1, 0, 0, 0, 1, 0, 0],
    [1, 0, 0, 1, 0, 0, 0],
    [1, 1, 1, 0, 1, 0, 0],
];

const LEFT_GUARD: [u8; 3] = [1, 0, 1];
const MID_GUARD: [u8; 5] = [0, 1, 0, 1, 0];
const RIGHT_GUARD: [u8; 3] = [1, 0, 1];

/// A validated UPC-A number: 11 zero-padded digits plus the computed check digit.
///
/// ```rust
/// use qrbar::barcode::Barcode;
///
/// let code = Barcode::new(12345678901).unwrap();
/// assert_eq!(code.check_digit(), 2);
/// assert_eq!(code.to_string(), "123456789012");
/// assert_eq!(code.encode().len(), 95);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barcode {
    digits: [u8; MAX_DIGITS],
    check: u8,
}

impl Barcode {
    /// Validates `number` and left-pads it with zeros to 11 digits.
    ///
    /// Returns [`CodeError::InputTooLarge`] if it has more than 11 digits.
    pub fn new(number: u64) -> Result<Self, CodeError> {
        let len = count_digits(number);
        if len > MAX_DIGITS {
            return Err(CodeError::InputTooLarge { len, max: MAX_DIGITS });
        }
        let mut digits = [0u8; MAX_DIGITS];
        let mut rest = number;
        for slot in digits.iter_mut().rev() {
            *slot = (rest % 10) as u8;
            rest /= 10;
        }
        Ok(Self {
            check: check_digit(&digits),
            digits,
        })
    }

    /// The 11 zero-padded data digits.
    pub fn digits(&self) -> &[u8; MAX_DIGITS] {
        &self.digits
    }

    /// The computed 12th digit.
    pub fn check_digit(&self) -> u8 {
        self.check
    }

    /// All 12 digits, check digit last.
    pub fn full_digits(&self) -> [u8; MAX_DIGITS + 1] {
        let mut result = [0u8; MAX_DIGITS + 1];
        result[..MAX_DIGITS].copy_from_slice(&self.digits);
        result[MAX_DIGITS] = self.check;
        result
    }

    /// Full bar sequence, `true` for a dark bar: left guard, six L-coded digits,
    /// middle guard, five R-coded digits and the R-coded check digit, right guard.
    pub fn encode(&self) -> Vec<bool> {
        let mut bars: Vec<u8> = Vec::with_capacity(SYMBOL_WIDTH);
        bars.extend_from_slice(&LEFT_GUARD);
        for &d in &self.digits[..6] {
            bars.extend_from_slice(&L_CODE[usize::from(d)]);
        }
        bars.extend_from_slice(&MID_GUARD);
        bars.extend(self.right_half());
        bars.extend_from_slice(&RIGHT_GUARD);
        debug_assert_eq!(bars.len(), SYMBOL_WIDTH);
        bars.into_iter().map(|b| b != 0).collect()
    }

    /// Compact sequence for secondary rendering: the last five digits and the check
    /// digit in R-code, without guards.
    pub fn encode_trimmed(&self) -> Vec<bool> {
        self.right_half().map(|b| b != 0).collect()
    }

    fn right_half(&self) -> impl Iterator<Item = u8> + '_ {
        self.digits[6..]
            .iter()
            .chain(std::iter::once(&self.check))
            .flat_map(|&d| R_CODE[usize::from(d)])
    }
}

impl TryFrom<i64> for Barcode {
    type Error = CodeError;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        let number = u64::try_from(number)
            .map_err(|_| CodeError::InvalidInputType(number.to_string()))?;
        Barcode::new(number)
    }
}

impl FromStr for Barcode {
    type Err = CodeError;

    /// Parses a decimal integer. Leading zeros do not count toward the digit limit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::InvalidInputType(s.to_string()));
        }
        let significant = trimmed.trim_start_matches('0');
        if significant.len() > MAX_DIGITS {
            return Err(CodeError::InputTooLarge { len: significant.len(), max: MAX_DIGITS });
        }
        let number = significant
            .bytes()
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));
        Barcode::new(number)
    }
}

impl std::fmt::Display for Barcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in self.full_digits() {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// Computes the UPC-A check digit: three times the digits at even indices plus the
/// digits at odd indices, then the distance to the next multiple of ten.
pub fn check_digit(digits: &[u8; MAX_DIGITS]) -> u8 {
    let odd: u32 = digits.iter().step_by(2).map(|&d| u32::from(d)).sum::<u32>() * 3;
    let even: u32 = digits.iter().skip(1).step_by(2).map(|&d| u32::from(d)).sum();
    ((10 - (odd + even) % 10) % 10) as u8
}

fn count_digits(mut number: u64) -> usize {
    let mut len = 1;
    while number >= 10 {
        number /= 10;
        len += 1;
    }
    len
}
