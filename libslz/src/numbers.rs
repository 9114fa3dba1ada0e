//! Numeric literal conversion.
//!
//! Conversion is strict: text that does not fit the target type is an error,
//! never a silently clamped or zeroed value.

use std::num::IntErrorKind;

use crate::error::ParseError;

pub fn parse_integer(text: &str) -> Result<i64, ParseError> {
    text.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ParseError::NumberOutOfRange(text.to_string())
        }
        _ => ParseError::MalformedNumber(text.to_string()),
    })
}

pub fn parse_float(text: &str) -> Result<f64, ParseError> {
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        Ok(_) => Err(ParseError::NumberOutOfRange(text.to_string())),
        Err(_) => Err(ParseError::MalformedNumber(text.to_string())),
    }
}

/// Numeric shape of a plain scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberShape {
    Integer,
    Float,
}

/// Classify plain text as a number: an optional leading `-`, digits, at most
/// one `.`, and at least one digit.
pub fn classify(text: &str) -> Option<NumberShape> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_dot = false;
    let mut seen_digit = false;

    for b in digits.bytes() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }

    match (seen_digit, seen_dot) {
        (false, _) => None,
        (true, true) => Some(NumberShape::Float),
        (true, false) => Some(NumberShape::Integer),
    }
}
