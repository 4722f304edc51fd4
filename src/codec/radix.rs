//! Integer <-> text conversion in radix 2..=64, used to keep the protocol
//! stream compact.
//!
//! Digits come from [`ALPHABET`]: `0-9`, then `a-z`, then `A-Z`, then `_`
//! and `@`. For radix 36 and below upper-case letters are also accepted on
//! decode, so streams from tools that print upper-case hex still parse.

use thiserror::Error;

use crate::shared::constants::{MAX_RADIX, MIN_RADIX, RADIX_ALPHABET};

pub const ALPHABET: &[u8; 64] = RADIX_ALPHABET;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadixError {
    #[error("radix {0} is outside 2..=64")]
    InvalidRadix(u32),

    #[error("'{digit}' is not a valid digit in radix {radix}")]
    InvalidDigit { digit: char, radix: u32 },

    #[error("no digits to decode")]
    Empty,

    #[error("value does not fit in 64 bits")]
    Overflow,
}

fn check_radix(radix: u32) -> Result<(), RadixError> {
    if (MIN_RADIX..=MAX_RADIX).contains(&radix) {
        Ok(())
    } else {
        Err(RadixError::InvalidRadix(radix))
    }
}

fn digit_value(digit: char, radix: u32) -> Result<u32, RadixError> {
    let invalid = || RadixError::InvalidDigit { digit, radix };
    if !digit.is_ascii() {
        return Err(invalid());
    }
    let lookup = if radix <= 36 {
        digit.to_ascii_lowercase() as u8
    } else {
        digit as u8
    };
    let value = ALPHABET
        .iter()
        .position(|&symbol| symbol == lookup)
        .ok_or_else(invalid)? as u32;
    if value >= radix {
        return Err(invalid());
    }
    Ok(value)
}

/// Most significant digit first, `-` prefix for negatives.
///
/// Zero encodes as a single `"0"` digit.
pub fn encode(value: i64, radix: u32) -> Result<String, RadixError> {
    check_radix(radix)?;

    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        return Ok("0".to_string());
    }

    let radix = radix as u64;
    let mut digits = Vec::with_capacity(16);
    while magnitude != 0 {
        digits.push(ALPHABET[(magnitude % radix) as usize]);
        magnitude /= radix;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();

    // Every byte comes from the ASCII alphabet or is '-'.
    Ok(digits.into_iter().map(char::from).collect())
}

pub fn decode(text: &str, radix: u32) -> Result<i64, RadixError> {
    check_radix(radix)?;

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() {
        return Err(RadixError::Empty);
    }

    let mut magnitude: u64 = 0;
    for digit in digits.chars() {
        let value = digit_value(digit, radix)?;
        magnitude = magnitude
            .checked_mul(radix as u64)
            .and_then(|m| m.checked_add(value as u64))
            .ok_or(RadixError::Overflow)?;
    }

    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(RadixError::Overflow);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| RadixError::Overflow)
    }
}
