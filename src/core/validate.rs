use std::ops::RangeInclusive;

use super::error::{EstimateError, Result};

/// Parses free-form numeric text. Empty or malformed input becomes `default`;
/// currency symbols, thousands separators and a trailing `%` are ignored.
pub fn parse_or_default(text: &str, default: f64) -> f64 {
    let cleaned = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect::<String>();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => default,
    }
}

/// Currency inputs never fail; negatives and NaN become zero.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn require_positive(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EstimateError::OutOfRange {
            field,
            value,
            reason: "must be > 0",
        })
    }
}

pub fn require_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EstimateError::OutOfRange {
            field,
            value,
            reason: "must be >= 0",
        })
    }
}

pub fn require_in_range(
    field: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
    reason: &'static str,
) -> Result<f64> {
    if value.is_finite() && range.contains(&value) {
        Ok(value)
    } else {
        Err(EstimateError::OutOfRange {
            field,
            value,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_text_falls_back_to_default() {
        assert_eq!(parse_or_default("", 0.0), 0.0);
        assert_eq!(parse_or_default("abc", 28.0), 28.0);
        assert_eq!(parse_or_default("NaN", 1.0), 1.0);
        assert_eq!(parse_or_default("inf", 1.0), 1.0);
    }

    #[test]
    fn currency_and_percent_text_is_cleaned() {
        assert_eq!(parse_or_default(" $300,000 ", 0.0), 300_000.0);
        assert_eq!(parse_or_default("7.5%", 0.0), 7.5);
        assert_eq!(parse_or_default("-12", 0.0), -12.0);
    }

    #[test]
    fn clamp_treats_negative_and_nan_as_zero() {
        assert_eq!(clamp_non_negative(-100.0), 0.0);
        assert_eq!(clamp_non_negative(f64::NAN), 0.0);
        assert_eq!(clamp_non_negative(42.0), 42.0);
    }

    #[test]
    fn range_checks() {
        assert!(require_positive("guests", 0.0).is_err());
        assert!(require_positive("guests", 10.0).is_ok());
        assert!(require_non_negative("gates", 0.0).is_ok());
        assert!(require_non_negative("gates", -1.0).is_err());

        let err = require_in_range("grade", 60.0, -45.0..=45.0, "must be between -45 and 45")
            .expect_err("out of range");
        assert_eq!(err.to_string(), "grade must be between -45 and 45, got 60");
    }
}
