use serde::Serialize;

use super::units::{Magnitude, Unit};

/// One row of a static lookup table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CategoryCoefficient {
    pub key: &'static str,
    pub coefficient: f64,
    pub label: &'static str,
    pub description: &'static str,
}

impl CategoryCoefficient {
    pub const fn new(
        key: &'static str,
        coefficient: f64,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            coefficient,
            label,
            description,
        }
    }

    /// The neutral row unknown keys fall back to.
    pub const fn neutral() -> Self {
        Self::new("neutral", 1.0, "Standard", "No adjustment")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultLine {
    pub label: String,
    pub value: Magnitude,
}

impl ResultLine {
    pub fn new(label: impl Into<String>, value: Magnitude) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    pub primary: Magnitude,
    /// Components that add up to `primary`.
    pub breakdown: Vec<ResultLine>,
    /// Ratios and side quantities that are not part of the sum.
    pub derived: Vec<ResultLine>,
    pub comparisons: Vec<ResultLine>,
}

impl EstimationResult {
    /// Builds a result whose primary value is the sum of its breakdown.
    pub fn from_breakdown(unit: Unit, breakdown: Vec<ResultLine>) -> Self {
        let total = breakdown.iter().map(|line| line.value.value).sum();
        Self {
            primary: Magnitude::new(total, unit),
            breakdown,
            derived: Vec::new(),
            comparisons: Vec::new(),
        }
    }

    pub fn with_derived(mut self, label: impl Into<String>, value: Magnitude) -> Self {
        self.derived.push(ResultLine::new(label, value));
        self
    }

    pub fn breakdown_total(&self) -> f64 {
        self.breakdown.iter().map(|line| line.value.value).sum()
    }

    pub fn breakdown_value(&self, label: &str) -> Option<f64> {
        find_line(&self.breakdown, label)
    }

    pub fn derived_value(&self, label: &str) -> Option<f64> {
        find_line(&self.derived, label)
    }
}

fn find_line(lines: &[ResultLine], label: &str) -> Option<f64> {
    lines
        .iter()
        .find(|line| line.label == label)
        .map(|line| line.value.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_is_sum_of_breakdown() {
        let result = EstimationResult::from_breakdown(
            Unit::Dollar,
            vec![
                ResultLine::new("a", Magnitude::dollars(10.25)),
                ResultLine::new("b", Magnitude::dollars(4.75)),
            ],
        )
        .with_derived("ratio", Magnitude::new(0.5, Unit::Ratio));

        assert_eq!(result.primary, Magnitude::dollars(15.0));
        assert_eq!(result.breakdown_value("b"), Some(4.75));
        assert_eq!(result.derived_value("ratio"), Some(0.5));
        assert_eq!(result.derived_value("missing"), None);
    }
}
