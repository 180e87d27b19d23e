//! Amount formatting helpers
//!
//! All token-amount math runs on `BigDecimal`: raw base-unit strings can
//! exceed both u64 range and f64 precision (18 fraction digits), so binary
//! floats are only accepted for display-only USD figures whose upstream
//! source is already lossy.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::str::FromStr;

/// Raised when a raw base-unit amount is not a valid integer string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAmountError {
    pub raw: String,
}

impl std::fmt::Display for InvalidAmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid base-unit amount: {:?}", self.raw)
    }
}

impl std::error::Error for InvalidAmountError {}

/// Convert a raw integer-string amount in base units ("wei") to its human
/// decimal form by shifting the decimal point left by `decimals` places.
///
/// The shift is exact: no rounding happens here.
pub fn from_base_units(raw: &str, decimals: u32) -> Result<BigDecimal, InvalidAmountError> {
    let digits = BigInt::from_str(raw.trim()).map_err(|_| InvalidAmountError {
        raw: raw.to_string(),
    })?;
    Ok(BigDecimal::new(digits, i64::from(decimals)))
}

/// Render a decimal amount as a compact human-readable magnitude.
///
/// Band policy (trailing zeros always stripped):
///
/// | range        | scale                     | rounding |
/// |--------------|---------------------------|----------|
/// | <1           | 4 decimals                | up       |
/// | [1,5)        | 3 decimals                | truncate |
/// | [5,10)       | 2 decimals                | truncate |
/// | [10,100)     | 1 decimal                 | truncate |
/// | [100,5000)   | 0 decimals                | truncate |
/// | [5000,1e6)   | ÷1e3, 1 decimal, "k"      | truncate |
/// | [1e6,1e9)    | ÷1e6, 1 decimal, "M"      | truncate |
/// | ≥1e9         | ÷1e9, 1 decimal, "B"      | truncate |
pub fn to_compact_display(value: &BigDecimal) -> String {
    let thousand = BigDecimal::from(1_000u32);
    let million = BigDecimal::from(1_000_000u32);
    let billion = BigDecimal::from(1_000_000_000u32);

    if value < &BigDecimal::from(1u32) {
        scaled(value, 4, RoundingMode::Up)
    } else if value < &BigDecimal::from(5u32) {
        scaled(value, 3, RoundingMode::Down)
    } else if value < &BigDecimal::from(10u32) {
        scaled(value, 2, RoundingMode::Down)
    } else if value < &BigDecimal::from(100u32) {
        scaled(value, 1, RoundingMode::Down)
    } else if value < &BigDecimal::from(5_000u32) {
        scaled(value, 0, RoundingMode::Down)
    } else if value < &million {
        scaled(&(value / thousand), 1, RoundingMode::Down) + "k"
    } else if value < &billion {
        scaled(&(value / million), 1, RoundingMode::Down) + "M"
    } else {
        scaled(&(value / billion), 1, RoundingMode::Down) + "B"
    }
}

/// Render a decimal amount in plain notation with trailing zeros stripped
/// ("1.5", never "1.500000000000000000").
pub fn to_plain_display(value: &BigDecimal) -> String {
    strip_trailing_zeros(value.to_string())
}

fn scaled(value: &BigDecimal, scale: i64, mode: RoundingMode) -> String {
    strip_trailing_zeros(value.with_scale_round(scale, mode).to_string())
}

fn strip_trailing_zeros(rendered: String) -> String {
    if rendered.contains('.') {
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        rendered
    }
}

/// US-style currency rendering with space group separators ("$1 234.56").
///
/// Display-only: accepts float input because upstream USD prices are
/// already lossy floats.
pub fn to_currency_display(value: f64) -> String {
    let negative = value < 0.0;
    let rendered = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rendered, "00".to_string()),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Shorten a wallet address for display: "0x1125...31e2".
pub fn abbreviate_address(address: &str) -> String {
    if address.len() > 10 && address.is_ascii() {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

/// Render a unix timestamp as a display date.
///
/// `full` selects "07 Aug 2026, 14:05" over the short "07.08.26".
pub fn format_timestamp(timestamp: i64, full: bool) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) if full => dt.format("%d %b %Y, %H:%M").to_string(),
        Some(dt) => dt.format("%d.%m.%y").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_units_shifts_exactly() {
        let one_ether = from_base_units("1000000000000000000", 18).unwrap();
        assert_eq!(one_ether, BigDecimal::from(1u32));

        let half = from_base_units("500000000000000000", 18).unwrap();
        assert_eq!(half, BigDecimal::from_str("0.5").unwrap());

        let tiny = from_base_units("1", 18).unwrap();
        assert_eq!(tiny, BigDecimal::from_str("0.000000000000000001").unwrap());
    }

    #[test]
    fn test_from_base_units_round_trip() {
        // Shifting back and stripping trailing zeros recovers the original
        // numeric value for every d in [0, 18].
        let raw = "123456789012345678901234567890";
        for decimals in 0..=18u32 {
            let shifted = from_base_units(raw, decimals).unwrap();
            let back = shifted * BigDecimal::new(num_bigint::BigInt::from(1), -(decimals as i64));
            assert_eq!(back, BigDecimal::from_str(raw).unwrap(), "d={}", decimals);
        }
    }

    #[test]
    fn test_from_base_units_rejects_garbage() {
        assert!(from_base_units("", 18).is_err());
        assert!(from_base_units("12.5", 18).is_err());
        assert!(from_base_units("0x1f", 18).is_err());
        assert!(from_base_units("abc", 18).is_err());
    }

    #[test]
    fn test_compact_display_bands() {
        let cases = [
            ("0.00001", "0.0001"), // sub-1 rounds up at 4 decimals
            ("0.12345", "0.1235"),
            ("1.2345", "1.234"), // [1,5) truncates at 3
            ("4.9999", "4.999"),
            ("5.678", "5.67"),   // [5,10) truncates at 2
            ("12.39", "12.3"),   // [10,100) truncates at 1
            ("123.9", "123"),    // [100,5000) truncates at 0
            ("4999.9", "4999"),
            ("5000", "5k"),
            ("7250", "7.2k"),
            ("999999", "999.9k"),
            ("1200000", "1.2M"),
            ("3400000000", "3.4B"),
        ];
        for (input, expected) in cases {
            let value = BigDecimal::from_str(input).unwrap();
            assert_eq!(to_compact_display(&value), expected, "input={}", input);
        }
    }

    #[test]
    fn test_compact_display_strips_trailing_zeros() {
        let value = BigDecimal::from_str("1.500").unwrap();
        assert_eq!(to_compact_display(&value), "1.5");

        let whole = BigDecimal::from_str("2.000").unwrap();
        assert_eq!(to_compact_display(&whole), "2");
    }

    #[test]
    fn test_compact_display_monotonic_within_band() {
        // a < b within one band implies displayed magnitude(a) <= magnitude(b)
        let pairs = [
            ("0.1", "0.9"),
            ("1.1", "4.9"),
            ("10.0", "99.0"),
            ("6000", "900000"),
        ];
        for (a, b) in pairs {
            let da: f64 = to_compact_display(&BigDecimal::from_str(a).unwrap())
                .trim_end_matches(['k', 'M', 'B'])
                .parse()
                .unwrap();
            let db: f64 = to_compact_display(&BigDecimal::from_str(b).unwrap())
                .trim_end_matches(['k', 'M', 'B'])
                .parse()
                .unwrap();
            assert!(da <= db, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(to_currency_display(1234.567), "$1 234.57");
        assert_eq!(to_currency_display(0.5), "$0.50");
        assert_eq!(to_currency_display(1000000.0), "$1 000 000.00");
        assert_eq!(to_currency_display(-12.3), "-$12.30");
    }

    #[test]
    fn test_abbreviate_address() {
        assert_eq!(
            abbreviate_address("0x112532B200980Ddee8226023bEbBE2E6884C31e2"),
            "0x1125...31e2"
        );
        assert_eq!(abbreviate_address("0xshort"), "0xshort");
    }
}
