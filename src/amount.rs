// 💰 Amount Parsing & Formatting - Brazilian locale
// "1.234,56" ↔ 1234.56 ↔ "R$ 1.234,56"
//
// Spreadsheet cells arrive as text, numbers or blanks. Parsing is total:
// garbage becomes 0.0, and `parse_outcome` tells the caller when that happened.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// RAW INPUT
// ============================================================================

/// A cell value before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// Already numeric (JSON number, computed value)
    Number(f64),

    /// Free text: "R$ 1.234,56", "3,5 km", "12"
    Text(String),

    /// Blank / null cell
    Missing,
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        RawAmount::Text(s.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(s: String) -> Self {
        RawAmount::Text(s)
    }
}

impl From<f64> for RawAmount {
    fn from(n: f64) -> Self {
        RawAmount::Number(n)
    }
}

impl<T: Into<RawAmount>> From<Option<T>> for RawAmount {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawAmount::Missing)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{}", n),
            RawAmount::Text(s) => write!(f, "{}", s),
            RawAmount::Missing => Ok(()),
        }
    }
}

// ============================================================================
// PARSE OUTCOME
// ============================================================================

/// Why a value was replaced by zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultReason {
    /// Null / absent cell
    Missing,

    /// Blank or whitespace-only text
    Empty,

    /// Text without a single digit ("abc", "R$ -")
    NoDigits,

    /// Digits present but conversion failed
    Malformed,

    /// NaN, infinity, or a digit run too long for f64
    NonFinite,
}

impl DefaultReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultReason::Missing => "missing",
            DefaultReason::Empty => "empty",
            DefaultReason::NoDigits => "no digits",
            DefaultReason::Malformed => "malformed",
            DefaultReason::NonFinite => "not finite",
        }
    }
}

/// Result of a lenient parse: the number, or an explicit "defaulted" marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountOutcome {
    Parsed(f64),
    Defaulted(DefaultReason),
}

impl AmountOutcome {
    /// Parsed value, or 0.0 when defaulted
    pub fn value(&self) -> f64 {
        match self {
            AmountOutcome::Parsed(v) => *v,
            AmountOutcome::Defaulted(_) => 0.0,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, AmountOutcome::Defaulted(_))
    }
}

/// Strict-mode failure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid amount {input:?}: {}", .reason.as_str())]
pub struct AmountError {
    pub input: String,
    pub reason: DefaultReason,
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse any cell into a number. Never fails: malformed input yields 0.0.
pub fn parse<R: Into<RawAmount>>(raw: R) -> f64 {
    parse_outcome(&raw.into()).value()
}

/// Parse and report whether the result was substituted
pub fn parse_outcome(raw: &RawAmount) -> AmountOutcome {
    let outcome = match raw {
        RawAmount::Missing => AmountOutcome::Defaulted(DefaultReason::Missing),
        RawAmount::Number(n) if n.is_finite() => AmountOutcome::Parsed(*n),
        RawAmount::Number(_) => AmountOutcome::Defaulted(DefaultReason::NonFinite),
        RawAmount::Text(text) => parse_text(text),
    };

    if let AmountOutcome::Defaulted(reason) = outcome {
        tracing::debug!(input = %raw, reason = reason.as_str(), "amount defaulted to zero");
    }

    outcome
}

/// Parse, surfacing malformed input as an error
pub fn parse_strict<R: Into<RawAmount>>(raw: R) -> Result<f64, AmountError> {
    let raw = raw.into();
    match parse_outcome(&raw) {
        AmountOutcome::Parsed(v) => Ok(v),
        AmountOutcome::Defaulted(reason) => Err(AmountError {
            input: raw.to_string(),
            reason,
        }),
    }
}

fn parse_text(text: &str) -> AmountOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return AmountOutcome::Defaulted(DefaultReason::Empty);
    }

    let kept: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return AmountOutcome::Defaulted(DefaultReason::NoDigits);
    }

    match canonical_separators(&kept).parse::<f64>() {
        Ok(v) if v.is_finite() => AmountOutcome::Parsed(v),
        Ok(_) => AmountOutcome::Defaulted(DefaultReason::NonFinite),
        Err(_) => AmountOutcome::Defaulted(DefaultReason::Malformed),
    }
}

/// Rewrite "1.234,56" as "1234.56"
///
/// The rightmost separator is the decimal one; the rest are grouping.
/// A lone separator kind repeated ("1.234.567") is grouping throughout.
fn canonical_separators(kept: &str) -> String {
    let Some(decimal_at) = kept.rfind(|c: char| c == ',' || c == '.') else {
        return kept.to_string();
    };

    let decimal = kept.as_bytes()[decimal_at] as char;
    let other = if decimal == ',' { '.' } else { ',' };
    let grouping_only = kept.matches(decimal).count() > 1 && !kept.contains(other);

    let mut out = String::with_capacity(kept.len());
    for (i, c) in kept.char_indices() {
        match c {
            ',' | '.' if i == decimal_at && !grouping_only => out.push('.'),
            ',' | '.' => {}
            digit => out.push(digit),
        }
    }
    out
}

// ============================================================================
// FORMATTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountStyle {
    /// "R$ 1.234,50"
    Currency,

    /// "1.234,567"
    Quantity,
}

impl AmountStyle {
    pub fn decimals(&self) -> usize {
        match self {
            AmountStyle::Currency => 2,
            AmountStyle::Quantity => 3,
        }
    }
}

/// Format with Brazilian grouping. `is_quantity` selects 3 decimals, no prefix.
pub fn format(amount: f64, is_quantity: bool) -> String {
    let style = if is_quantity {
        AmountStyle::Quantity
    } else {
        AmountStyle::Currency
    };
    format_amount(amount, style)
}

pub fn format_amount(amount: f64, style: AmountStyle) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };

    let fixed = format!("{:.*}", style.decimals(), amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    // -0.001 rounds to "0.00": no sign
    let negative = amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let sign = if negative { "-" } else { "" };
    let body = format!("{},{}", group_thousands(int_part), frac_part);

    match style {
        AmountStyle::Currency => format!("R$ {}{}", sign, body),
        AmountStyle::Quantity => format!("{}{}", sign, body),
    }
}

/// Format a raw cell. Unparseable text in currency style is echoed as-is.
pub fn format_raw(raw: &RawAmount, style: AmountStyle) -> String {
    match parse_outcome(raw) {
        AmountOutcome::Parsed(v) => format_amount(v, style),
        AmountOutcome::Defaulted(_) => match (raw, style) {
            (RawAmount::Text(text), AmountStyle::Currency) if !text.trim().is_empty() => {
                text.clone()
            }
            _ => format_amount(0.0, style),
        },
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
