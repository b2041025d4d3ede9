//! Numeric option arguments

/// Parse an unsigned integer the way C's `strtoul(text, _, 0)` picks its base:
/// `0x`/`0X` selects hexadecimal, a leading `0` selects octal, anything else
/// is decimal. The whole string must be consumed.
///
/// Values too large for `u64` saturate, so callers range-checking against a
/// smaller type still see them as out of range rather than malformed.
pub fn parse_unsigned(text: &str) -> Option<u64> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    if digits.is_empty() {
        return None;
    }

    let mut value: u64 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(radix)?;
        value = value
            .saturating_mul(u64::from(radix))
            .saturating_add(u64::from(digit));
    }
    Some(value)
}
