//! Numeric parsing for cell text
//!
//! Report cells carry browser-formatted numbers. Two conversions are needed:
//!
//! ```text
//! parse_float("12.5 GB")  -> 12.5   (leading numeric prefix, rest ignored)
//! to_number("12.5 GB")    -> NaN    (whole string must be numeric)
//! to_number("  ")         -> 0      (blank counts as zero)
//! ```
//!
//! The first is used to decide whether a value sorts numerically, the second
//! when a number is compared against text.

use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;

/// Parser for numeric cell values
pub struct NumberParser {
    /// Leading float prefix: sign, digits, fraction, exponent
    prefix_regex: Regex,
    /// A complete decimal literal and nothing else
    literal_regex: Regex,
}

impl NumberParser {
    /// Create a new number parser
    pub fn new() -> Result<Self> {
        let prefix_regex =
            Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")?;
        let literal_regex = Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$")?;

        Ok(Self {
            prefix_regex,
            literal_regex,
        })
    }

    /// Process-wide parser, compiled on first use
    pub fn shared() -> &'static NumberParser {
        static PARSER: OnceLock<NumberParser> = OnceLock::new();
        PARSER.get_or_init(NumberParser::default)
    }

    /// Parse the longest numeric prefix of `text`, or NaN when there is none
    pub fn parse_float(&self, text: &str) -> f64 {
        let text = text.trim_start();
        let Some(m) = self.prefix_regex.find(text) else {
            return f64::NAN;
        };
        parse_literal(m.as_str())
    }

    /// Convert the whole of `text` to a number, or NaN when any part is not numeric
    pub fn to_number(&self, text: &str) -> f64 {
        let text = text.trim();
        if text.is_empty() {
            return 0.0;
        }

        match text {
            "Infinity" | "+Infinity" => return f64::INFINITY,
            "-Infinity" => return f64::NEG_INFINITY,
            _ => {}
        }

        let lower = text.to_ascii_lowercase();
        for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
            if let Some(digits) = lower.strip_prefix(prefix) {
                return u64::from_str_radix(digits, radix)
                    .map(|v| v as f64)
                    .unwrap_or(f64::NAN);
            }
        }

        if self.literal_regex.is_match(text) {
            parse_literal(text)
        } else {
            f64::NAN
        }
    }
}

impl Default for NumberParser {
    fn default() -> Self {
        Self::new().expect("Failed to create number parser - regex compilation failed")
    }
}

fn parse_literal(literal: &str) -> f64 {
    match literal {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // "1." is valid here but not for str::parse
        _ => literal
            .trim_end_matches('.')
            .parse()
            .or_else(|_| literal.parse())
            .unwrap_or(f64::NAN),
    }
}

/// Leading-prefix float parse with the shared parser
pub fn parse_float(text: &str) -> f64 {
    NumberParser::shared().parse_float(text)
}

/// Whole-string numeric conversion with the shared parser
pub fn to_number(text: &str) -> f64 {
    NumberParser::shared().to_number(text)
}

/// Round to two decimal places the way a browser's `toFixed(2)` does.
///
/// Rounding works on the exact binary value, so `0.015` (stored just below
/// it) gives `0.01`. Exact halfway values round away from zero. NaN,
/// infinities and magnitudes of `1e21` and above pass through.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= 1e21 {
        return value;
    }

    let magnitude = value.abs();
    // a two-decimal tie is an odd multiple of 1/8; scaling by 8 is exact
    let eighths = magnitude * 8.0;
    let rounded = if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        (magnitude * 100.0).ceil() / 100.0
    } else {
        format!("{:.2}", magnitude).parse().unwrap_or(magnitude)
    };
    rounded.copysign(value)
}

/// Read a cell's precise numeric source as a chart value.
///
/// A missing source yields NaN, which chart configurations carry as `null`.
pub fn precise_value(source: Option<&str>) -> f64 {
    match source {
        Some(text) => round2(parse_float(text.trim())),
        None => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("1234.5"), 1234.5);
        assert_eq!(parse_float("  42px"), 42.0);
        assert_eq!(parse_float("-3.25e2 units"), -325.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("7."), 7.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("Infinity"), f64::INFINITY);
    }

    #[test]
    fn test_parse_float_nan() {
        assert!(parse_float("apple").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float("$12").is_nan());
        assert!(parse_float("inf").is_nan());
    }

    #[test]
    fn test_to_number_whole_string() {
        assert_eq!(to_number(" 12 "), 12.0);
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("0x1f"), 31.0);
        assert!(to_number("12abc").is_nan());
        assert!(to_number("apple").is_nan());
        assert!(to_number("NaN").is_nan());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235001), 1.24);
        assert_eq!(round2(-0.125), -0.13);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn test_round2_uses_exact_binary_value() {
        // stored just below the halfway point
        assert_eq!(round2(0.015), 0.01);
        assert_eq!(round2(0.045), 0.04);
        assert_eq!(round2(1.005), 1.0);
        // exact ties go up in magnitude
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.375), 2.38);
        assert_eq!(round2(1e21), 1e21);
        assert_eq!(precise_value(Some("0.015")), 0.01);
    }

    #[test]
    fn test_precise_value() {
        assert_eq!(precise_value(Some(" 1234.5678 ")), 1234.57);
        assert!(precise_value(Some("n/a")).is_nan());
        assert!(precise_value(None).is_nan());
    }
}
