//! Base 64 VLQ
//!
//! A single base 64 digit can contain 6 bits of data. For the base 64
//! variable length quantities we use in the source map format, the first bit
//! is the sign, the next four bits are the actual value, and the 6th bit is
//! the continuation bit. The continuation bit tells us whether there are
//! more digits in this value following this digit.
//!
//!   Continuation
//!   |    Sign
//!   |    |
//!   V    V
//!   101011

use crate::base64;
use crate::error::{Result, SourceMapError};

const VLQ_BASE_SHIFT: u32 = 5;

// binary: 100000
const VLQ_BASE: i32 = 1 << VLQ_BASE_SHIFT;

// binary: 011111
const VLQ_BASE_MASK: i32 = VLQ_BASE - 1;

// binary: 100000
const VLQ_CONTINUATION_BIT: i32 = VLQ_BASE;

// 12 digits carry 60 bits, anything longer cannot fit in an i64.
const VLQ_MAX_SHIFT: u32 = 60;

/// Converts from a two-complement value to a value where the sign bit is
/// placed in the least significant bit. For example, as decimals:
///   1 becomes 2 (10 binary), -1 becomes 3 (11 binary)
///   2 becomes 4 (100 binary), -2 becomes 5 (101 binary)
fn to_vlq_signed(value: i64) -> u64 {
    let magnitude = value.unsigned_abs() << 1;
    if value < 0 {
        magnitude | 1
    } else {
        magnitude
    }
}

/// Converts to a two-complement value from a value where the sign bit is
/// placed in the least significant bit.
fn from_vlq_signed(value: u64) -> i64 {
    let shifted = (value >> 1) as i64;
    if value & 1 == 1 {
        -shifted
    } else {
        shifted
    }
}

/// Returns the base 64 VLQ encoded value.
pub fn encode(value: i64) -> String {
    let mut out = String::new();
    encode_into(value, &mut out);
    out
}

/// Appends the base 64 VLQ encoded value to `out`.
pub fn encode_into(value: i64, out: &mut String) {
    let mut vlq = to_vlq_signed(value);
    loop {
        let mut digit = vlq & VLQ_BASE_MASK as u64;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            // There are still more digits in this value, so we must make sure
            // the continuation bit is marked.
            digit |= VLQ_CONTINUATION_BIT as u64;
        }
        out.push(base64::digit(digit));
        if vlq == 0 {
            break;
        }
    }
}

/// Decodes the next base 64 VLQ value from `input` starting at `index`.
/// Returns the value and the index just past its last digit.
pub fn decode(input: &[u8], index: usize) -> Result<(i64, usize)> {
    let mut index = index;
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let byte = *input.get(index).ok_or_else(|| {
            SourceMapError::decode("Expected more digits in base 64 VLQ value.")
        })?;
        let digit = base64::decode(byte as char);
        if digit == -1 {
            return Err(SourceMapError::decode(format!(
                "Invalid base64 digit: {}",
                byte as char
            )));
        }
        index += 1;

        if shift >= VLQ_MAX_SHIFT {
            return Err(SourceMapError::decode("Base 64 VLQ value is too large."));
        }

        let continuation = digit & VLQ_CONTINUATION_BIT != 0;
        result += ((digit & VLQ_BASE_MASK) as u64) << shift;
        shift += VLQ_BASE_SHIFT;

        if !continuation {
            break;
        }
    }

    Ok((from_vlq_signed(result), index))
}
