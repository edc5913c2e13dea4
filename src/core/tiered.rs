//! Cumulative charges over ordered rate bands.
//!
//! The first band is a flat minimum charge; every band after it is billed per
//! 1,000 units of magnitude falling inside it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{EstimateError, Result};

pub const RATE_UNIT: f64 = 1_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Sale,
    Refinance,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Sale => "Sale",
            TransactionKind::Refinance => "Refinance",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBand {
    pub lower_bound: f64,
    /// `None` for the open-ended top band.
    pub upper_bound: Option<f64>,
    pub base_amount: f64,
    /// Charge per 1,000 units consumed inside the band.
    pub per_unit_rate: f64,
}

impl RateBand {
    pub const fn flat(upper_bound: f64, base_amount: f64) -> Self {
        Self {
            lower_bound: 0.0,
            upper_bound: Some(upper_bound),
            base_amount,
            per_unit_rate: 0.0,
        }
    }

    pub const fn rate(lower_bound: f64, upper_bound: Option<f64>, per_unit_rate: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            base_amount: 0.0,
            per_unit_rate,
        }
    }

    pub fn width(&self) -> f64 {
        match self.upper_bound {
            Some(upper) => upper - self.lower_bound,
            None => f64::INFINITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateTable {
    kind: TransactionKind,
    bands: Vec<RateBand>,
}

impl RateTable {
    pub fn new(kind: TransactionKind, bands: Vec<RateBand>) -> Result<Self> {
        validate_bands(&bands)?;
        Ok(Self { kind, bands })
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn bands(&self) -> &[RateBand] {
        &self.bands
    }
}

fn validate_bands(bands: &[RateBand]) -> Result<()> {
    let Some(first) = bands.first() else {
        return Err(EstimateError::InvalidRateTable("table has no bands".to_string()));
    };
    if first.lower_bound != 0.0 {
        return Err(EstimateError::InvalidRateTable(
            "first band must start at 0".to_string(),
        ));
    }
    if first.per_unit_rate != 0.0 {
        return Err(EstimateError::InvalidRateTable(
            "first band must be a flat base amount".to_string(),
        ));
    }

    let last = bands.len() - 1;
    for (idx, band) in bands.iter().enumerate() {
        if band.base_amount < 0.0 || band.per_unit_rate < 0.0 {
            return Err(EstimateError::InvalidRateTable(format!(
                "band {idx} has a negative charge"
            )));
        }
        if idx > 0 && band.base_amount != 0.0 {
            return Err(EstimateError::InvalidRateTable(format!(
                "band {idx} must use a per-unit rate, not a base amount"
            )));
        }
        match band.upper_bound {
            Some(upper) if upper <= band.lower_bound => {
                return Err(EstimateError::InvalidRateTable(format!(
                    "band {idx} is empty or inverted"
                )));
            }
            None if idx != last => {
                return Err(EstimateError::InvalidRateTable(format!(
                    "band {idx} is open-ended but not last"
                )));
            }
            _ => {}
        }
        if idx > 0 && bands[idx - 1].upper_bound != Some(band.lower_bound) {
            return Err(EstimateError::InvalidRateTable(format!(
                "band {idx} does not start where band {} ends",
                idx - 1
            )));
        }
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandCharge {
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub consumed: f64,
    pub charge: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredAmount {
    pub total: f64,
    pub per_band: Vec<BandCharge>,
}

/// Walks the bands in order and accumulates the charge for `magnitude`.
///
/// Non-positive (and non-finite) magnitudes are treated as zero and produce
/// an empty breakdown. A magnitude exactly on a band's upper bound stays
/// entirely in that band.
pub fn compute_tiered_amount(magnitude: f64, table: &RateTable) -> TieredAmount {
    if !magnitude.is_finite() || magnitude <= 0.0 {
        return TieredAmount {
            total: 0.0,
            per_band: Vec::new(),
        };
    }

    let mut remaining = magnitude;
    let mut total = 0.0;
    let mut per_band = Vec::new();

    for (idx, band) in table.bands.iter().enumerate() {
        if remaining <= 0.0 {
            break;
        }
        let width = band.width();
        let (consumed, charge) = if idx == 0 {
            (width.min(remaining), band.base_amount)
        } else {
            let consumed = remaining.min(width);
            (consumed, consumed / RATE_UNIT * band.per_unit_rate)
        };
        // The flat band absorbs its whole width even when the magnitude is smaller.
        remaining -= if idx == 0 { width } else { consumed };
        total += charge;
        per_band.push(BandCharge {
            lower_bound: band.lower_bound,
            upper_bound: band.upper_bound,
            consumed,
            charge,
        });
    }

    debug!(
        magnitude,
        kind = table.kind.label(),
        bands_used = per_band.len(),
        total,
        "tiered amount computed"
    );
    TieredAmount { total, per_band }
}
