//! Payload parsing and bounds checks.
//!
//! Pure functions, no locking and no I/O. The grammar matches the kernel's
//! `kstrto*` family with base 0: an optional sign, `0x`/`0X` selects hex, a
//! leading `0` selects octal, anything else is decimal, and one newline may
//! follow the digits. [`terminate`] separately drops the single trailing
//! newline or NUL that ends a write payload, so `"2\n\n"` still parses.

use procintf_common::error::{IntfError, ParseError};

/// Strip one trailing terminator and view the payload as text.
pub fn terminate(bytes: &[u8]) -> Result<&str, ParseError> {
    let body = match bytes.last() {
        Some(b'\n') | Some(0) => &bytes[..bytes.len() - 1],
        _ => bytes,
    };
    std::str::from_utf8(body).map_err(|_| ParseError::NotText)
}

/// Parse an integer literal with base auto-detection.
///
/// Accepts a leading `-`; callers that need an unsigned value use
/// [`parse_unsigned`].
pub fn parse_integer(text: &str) -> Result<i64, ParseError> {
    let text = strip_newline(text);
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = parse_magnitude(digits)?;
    if negative {
        // i64::MIN has no positive counterpart.
        if magnitude == i64::MIN.unsigned_abs() {
            return Ok(i64::MIN);
        }
        let m = i64::try_from(magnitude).map_err(|_| ParseError::Overflow)?;
        Ok(-m)
    } else {
        i64::try_from(magnitude).map_err(|_| ParseError::Overflow)
    }
}

/// Parse an unsigned 32-bit literal; a `-` sign is an invalid digit.
pub fn parse_unsigned(text: &str) -> Result<u32, ParseError> {
    let text = strip_newline(text);
    let digits = text.strip_prefix('+').unwrap_or(text);
    let magnitude = parse_magnitude(digits)?;
    u32::try_from(magnitude).map_err(|_| ParseError::Overflow)
}

/// Parse a signed 32-bit literal.
pub fn parse_signed(text: &str) -> Result<i32, ParseError> {
    let value = parse_integer(text)?;
    i32::try_from(value).map_err(|_| ParseError::Overflow)
}

/// Reject `value` outside `lo..=hi`.
pub fn check_range(value: i64, lo: i64, hi: i64) -> Result<(), IntfError> {
    if value < lo || value > hi {
        return Err(IntfError::RangeViolation {
            value,
            min: lo,
            max: hi,
        });
    }
    Ok(())
}

fn strip_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

fn parse_magnitude(digits: &str) -> Result<u64, ParseError> {
    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if body.is_empty() {
        return Err(if digits.is_empty() {
            ParseError::Empty
        } else {
            ParseError::InvalidDigit
        });
    }

    let mut acc: u64 = 0;
    for c in body.chars() {
        let d = c.to_digit(radix).ok_or(ParseError::InvalidDigit)?;
        acc = acc
            .checked_mul(radix as u64)
            .and_then(|v| v.checked_add(d as u64))
            .ok_or(ParseError::Overflow)?;
    }
    Ok(acc)
}
