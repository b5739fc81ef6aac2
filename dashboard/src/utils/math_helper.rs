use alloy::primitives::{utils, U256};

/// `10^exponent`, or `None` when it does not fit in a `U256`
fn pow10(exponent: u8) -> Option<U256> {
    U256::from(10).checked_pow(U256::from(exponent))
}

pub fn divide_by_precision_f64(value: U256, precision: u8) -> f64 {
    let scale = match pow10(precision) {
        Some(scale) => scale,
        None => return format_units(value, precision).parse().unwrap_or(0.0),
    };

    // Perform integer division and get both quotient and remainder
    let quotient = value / scale;
    let remainder = value % scale;

    // Try to convert quotient to u128, return MAX if too large
    let quotient_u128 = match u128::try_from(quotient) {
        Ok(q) => q,
        Err(_) => return f64::MAX,
    };

    let fraction = match (u128::try_from(remainder), u128::try_from(scale)) {
        (Ok(remainder), Ok(scale)) => remainder as f64 / scale as f64,
        // Precisions above 38 digits
        _ => format_units(remainder, precision).parse().unwrap_or(0.0),
    };

    quotient_u128 as f64 + fraction
}

/// Rescales `value` from `decimals` implied digits to `places` implied digits,
/// rounding half up when digits are dropped.
pub fn rescale(value: U256, decimals: u8, places: u8) -> U256 {
    if places >= decimals {
        return match pow10(places - decimals) {
            Some(factor) => value.saturating_mul(factor),
            None => U256::MAX,
        };
    }

    let divisor = match pow10(decimals - places) {
        Some(divisor) => divisor,
        // Divisor exceeds any U256, the value rounds to zero
        None => return U256::ZERO,
    };

    let quotient = value / divisor;
    let remainder = value % divisor;

    // remainder * 2 >= divisor, written so it cannot overflow
    if remainder >= divisor - remainder {
        quotient + U256::from(1)
    } else {
        quotient
    }
}

/// Renders `value` (with `decimals` implied digits) with exactly `places` fractional digits.
///
/// `format_units_fixed(1234567891, 6, 6) == "1234.567891"`
pub fn format_units_fixed(value: U256, decimals: u8, places: u8) -> String {
    let scaled = rescale(value, decimals, places);
    if places == 0 {
        return scaled.to_string();
    }

    let digits = scaled.to_string();
    let places = places as usize;
    let padded = format!("{:0>width$}", digits, width = places + 1);
    let (integer, fraction) = padded.split_at(padded.len() - places);
    format!("{}.{}", integer, fraction)
}

/// Renders `value` (with `decimals` implied digits) at full precision, trailing
/// zeros trimmed but at least one fractional digit kept.
///
/// `format_units(50000000000000000000000000, 27) == "0.05"`
pub fn format_units(value: U256, decimals: u8) -> String {
    let rendered = match utils::format_units(value, decimals) {
        Ok(rendered) => rendered,
        // Past 77 decimals every U256 is below one
        Err(_) => format!("0.{:0>width$}", value, width = decimals as usize),
    };

    match rendered.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            let fraction = if fraction.is_empty() { "0" } else { fraction };
            format!("{}.{}", integer, fraction)
        }
        None => format!("{}.0", rendered),
    }
}

/// Parses a base-10 integer string, as chain values are passed around
pub fn parse_u256(value: &str) -> Option<U256> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(value, 10).ok()
}

/// Parses an unsigned integer literal, base-10 or `0x` prefixed hex.
///
/// Negative values are rejected.
pub fn parse_uint_literal(value: &str) -> Option<U256> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            U256::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None => parse_u256(value),
    }
}
