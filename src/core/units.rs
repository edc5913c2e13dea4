use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{EstimateError, Result};

pub const KG_PER_LB: f64 = 0.453_592_37;
pub const METERS_PER_MILE: f64 = 1_609.344;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const MM_PER_INCH: f64 = 25.4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Dimension {
    Mass,
    Length,
    Time,
    Speed,
    Currency,
    Percent,
    Energy,
    Power,
    Count,
    Ratio,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "mi")]
    Mile,
    #[serde(rename = "km")]
    Kilometer,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "ft")]
    Foot,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "min")]
    Minute,
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "mph")]
    MilesPerHour,
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "usd")]
    Dollar,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "kcal")]
    Kilocalorie,
    #[serde(rename = "W")]
    Watt,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "ratio")]
    Ratio,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Pound | Unit::Kilogram => Dimension::Mass,
            Unit::Mile | Unit::Kilometer | Unit::Meter | Unit::Foot | Unit::Inch | Unit::Millimeter => {
                Dimension::Length
            }
            Unit::Second | Unit::Minute | Unit::Hour => Dimension::Time,
            Unit::MetersPerSecond | Unit::MilesPerHour | Unit::KilometersPerHour => Dimension::Speed,
            Unit::Dollar => Dimension::Currency,
            Unit::Percent => Dimension::Percent,
            Unit::Kilocalorie => Dimension::Energy,
            Unit::Watt => Dimension::Power,
            Unit::Count => Dimension::Count,
            Unit::Ratio => Dimension::Ratio,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Pound => "lb",
            Unit::Kilogram => "kg",
            Unit::Mile => "mi",
            Unit::Kilometer => "km",
            Unit::Meter => "m",
            Unit::Foot => "ft",
            Unit::Inch => "in",
            Unit::Millimeter => "mm",
            Unit::Second => "s",
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::MetersPerSecond => "m/s",
            Unit::MilesPerHour => "mph",
            Unit::KilometersPerHour => "km/h",
            Unit::Dollar => "usd",
            Unit::Percent => "%",
            Unit::Kilocalorie => "kcal",
            Unit::Watt => "W",
            Unit::Count => "count",
            Unit::Ratio => "ratio",
        }
    }

    /// Factor to the SI base of the unit's dimension, for dimensions that have
    /// registered conversions.
    fn base_factor(self) -> Option<f64> {
        match self {
            Unit::Kilogram => Some(1.0),
            Unit::Pound => Some(KG_PER_LB),
            Unit::Meter => Some(1.0),
            Unit::Kilometer => Some(1_000.0),
            Unit::Mile => Some(METERS_PER_MILE),
            Unit::Foot => Some(METERS_PER_FOOT),
            Unit::Inch => Some(MM_PER_INCH / 1_000.0),
            Unit::Millimeter => Some(0.001),
            Unit::Second => Some(1.0),
            Unit::Minute => Some(60.0),
            Unit::Hour => Some(3_600.0),
            Unit::MetersPerSecond => Some(1.0),
            Unit::MilesPerHour => Some(METERS_PER_MILE / 3_600.0),
            Unit::KilometersPerHour => Some(1_000.0 / 3_600.0),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts `value` between two units of the same dimension.
///
/// Identity conversions always succeed. Any other pair must have a registered
/// factor; asking for e.g. pounds to miles is a caller bug and is reported as
/// [`EstimateError::UnsupportedUnitPair`].
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64> {
    if from == to {
        return Ok(value);
    }
    if from.dimension() != to.dimension() {
        return Err(EstimateError::UnsupportedUnitPair { from, to });
    }
    match (from.base_factor(), to.base_factor()) {
        (Some(a), Some(b)) => Ok(value * a / b),
        _ => Err(EstimateError::UnsupportedUnitPair { from, to }),
    }
}

/// Walking/running pace in minutes per mile to speed in metres per second.
/// A non-positive pace means standing still.
pub fn pace_to_speed(minutes_per_mile: f64) -> f64 {
    if minutes_per_mile <= 0.0 || !minutes_per_mile.is_finite() {
        return 0.0;
    }
    METERS_PER_MILE / (minutes_per_mile * 60.0)
}

/// A scalar tagged with its unit. Conversions return new values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Magnitude {
    pub value: f64,
    pub unit: Unit,
}

impl Magnitude {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn dollars(value: f64) -> Self {
        Self::new(value, Unit::Dollar)
    }

    pub fn value_in(self, unit: Unit) -> Result<f64> {
        convert(self.value, self.unit, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn registered_pairs_use_exact_factors() {
        assert_approx(convert(1.0, Unit::Pound, Unit::Kilogram).unwrap(), 0.45359237);
        assert_approx(convert(1.0, Unit::Mile, Unit::Kilometer).unwrap(), 1.609344);
        assert_approx(convert(2.0, Unit::Inch, Unit::Millimeter).unwrap(), 50.8);
        assert_approx(convert(90.0, Unit::Minute, Unit::Hour).unwrap(), 1.5);
    }

    #[test]
    fn cross_dimension_pairs_are_rejected() {
        let err = convert(1.0, Unit::Pound, Unit::Mile).expect_err("mass to length");
        assert_eq!(
            err,
            EstimateError::UnsupportedUnitPair {
                from: Unit::Pound,
                to: Unit::Mile
            }
        );
    }

    #[test]
    fn dimensions_without_factors_only_allow_identity() {
        assert_approx(convert(12.0, Unit::Dollar, Unit::Dollar).unwrap(), 12.0);
        assert!(convert(1.0, Unit::Kilocalorie, Unit::Watt).is_err());
    }

    #[test]
    fn fifteen_minute_mile_is_four_mph() {
        let speed = pace_to_speed(15.0);
        assert_approx(speed, 1.78816);
        assert_approx(convert(speed, Unit::MetersPerSecond, Unit::MilesPerHour).unwrap(), 4.0);
        assert_approx(pace_to_speed(0.0), 0.0);
    }

    #[test]
    fn magnitude_conversion_keeps_original() {
        let load = Magnitude::new(35.0, Unit::Pound);
        let kg = load.value_in(Unit::Kilogram).unwrap();
        assert_eq!(load.unit, Unit::Pound);
        assert_eq!(load.value, 35.0);
        assert_approx(kg, 35.0 * KG_PER_LB);
    }

    proptest! {
        #[test]
        fn prop_pound_kilogram_round_trip(x in 0.0f64..1.0e6) {
            let kg = convert(x, Unit::Pound, Unit::Kilogram).unwrap();
            let back = convert(kg, Unit::Kilogram, Unit::Pound).unwrap();
            prop_assert!((back - x).abs() <= 1e-6 * x.max(1.0));
        }

        #[test]
        fn prop_inch_millimeter_round_trip(x in 0.0f64..1.0e5) {
            let mm = convert(x, Unit::Inch, Unit::Millimeter).unwrap();
            let back = convert(mm, Unit::Millimeter, Unit::Inch).unwrap();
            prop_assert!((back - x).abs() <= 1e-6 * x.max(1.0));
        }
    }
}
