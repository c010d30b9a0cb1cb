//! Base64 digits used by the VLQ encoding.

use crate::error::{Result, SourceMapError};

const B64_DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode an integer in the range of 0 to 63 to a single base 64 digit.
pub fn encode(value: u32) -> Result<char> {
    match B64_DIGITS.get(value as usize) {
        Some(digit) => Ok(*digit as char),
        None => Err(SourceMapError::EncodingRange(value)),
    }
}

/// Infallible variant for callers that already masked the value to six bits.
pub(crate) fn digit(value: u64) -> char {
    B64_DIGITS[(value & 63) as usize] as char
}

/// Decode a single base 64 character code digit to an integer. Returns -1 on
/// failure.
pub fn decode(digit: char) -> i32 {
    match digit {
        'A'..='Z' => digit as i32 - 'A' as i32,
        'a'..='z' => digit as i32 - 'a' as i32 + 26,
        '0'..='9' => digit as i32 - '0' as i32 + 52,
        '+' => 62,
        '/' => 63,
        _ => -1,
    }
}
