//! Error types for the estimation engine.

use super::units::Unit;

/// Errors that can occur while validating inputs or evaluating an estimate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// No conversion factor is registered between the two units.
    #[error("no conversion registered from {from} to {to}")]
    UnsupportedUnitPair { from: Unit, to: Unit },

    /// Body weight must be strictly positive for load-carriage formulas.
    #[error("body weight must be > 0, got {0}")]
    InvalidBodyWeight(f64),

    /// Refractive index must be strictly greater than 1.
    #[error("refractive index must be > 1, got {0}")]
    InvalidRefractiveIndex(f64),

    /// A scalar input fell outside its accepted range.
    #[error("{field} {reason}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Rate table bands are empty, unordered or overlapping.
    #[error("invalid rate table: {0}")]
    InvalidRateTable(String),

    /// The comparison key does not apply to the chosen formula.
    #[error("{key} cannot be varied for the {formula} formula")]
    UnsupportedVaryingKey {
        key: &'static str,
        formula: &'static str,
    },

    /// A calendar input was unparseable or outside the supported window.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A brand mark could not be rendered.
    #[error("invalid brand: {0}")]
    InvalidBrand(String),
}

impl EstimateError {
    /// Domain-guard failures suppress computation and show a placeholder;
    /// everything else is a rejected input.
    pub fn is_domain_guard(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidBodyWeight(_) | EstimateError::InvalidRefractiveIndex(_)
        )
    }
}

/// Result type for estimation operations.
pub type Result<T> = std::result::Result<T, EstimateError>;
