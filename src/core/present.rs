//! Display formatting for estimation results.
//!
//! Currency breakdown lines are shown to the cent and headline totals to the
//! whole dollar, both rounding half away from zero. Breakdown cents are
//! reconciled so the displayed lines always add up to the displayed total.

use serde::Serialize;

use super::types::{EstimationResult, ResultLine};
use super::units::{Dimension, Magnitude, Unit};

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round_whole(value: f64) -> f64 {
    value.round()
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// `1234.567` -> `"$1,234.57"`.
pub fn format_currency(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// `2070.6` -> `"$2,071"`.
pub fn format_currency_whole(value: f64) -> String {
    let whole = round_whole(value) as i64;
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(whole.unsigned_abs()))
}

/// Takes a value already expressed in percent: `7.5` -> `"7.5%"`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", round_to(value, 1) + 0.0)
}

/// Signed percent change, `"+12.5%"` or `"-3.0%"`.
pub fn format_percent_delta(value: f64) -> String {
    let rounded = round_to(value, 1) + 0.0;
    if rounded > 0.0 {
        format!("+{rounded:.1}%")
    } else {
        format!("{rounded:.1}%")
    }
}

/// Percent change from `base` to `value`; zero when there is no base.
pub fn percent_change(base: f64, value: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    (value - base) / base * 100.0
}

pub fn format_magnitude(magnitude: Magnitude) -> String {
    match magnitude.unit.dimension() {
        Dimension::Currency => format_currency(magnitude.value),
        Dimension::Percent => format_percent(magnitude.value),
        Dimension::Count => group_thousands(magnitude.value.round().max(0.0) as u64),
        Dimension::Ratio => format!("{:.2}", magnitude.value),
        Dimension::Energy | Dimension::Power => {
            format!("{} {}", group_thousands(magnitude.value.round().max(0.0) as u64), magnitude.unit)
        }
        _ => format!("{:.1} {}", magnitude.value, magnitude.unit),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedLine {
    pub label: String,
    pub value: f64,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedResult {
    pub headline: String,
    pub total: PresentedLine,
    pub breakdown: Vec<PresentedLine>,
    pub derived: Vec<PresentedLine>,
    pub comparisons: Vec<PresentedLine>,
}

pub fn present(result: &EstimationResult) -> PresentedResult {
    let unit = result.primary.unit;
    if unit == Unit::Dollar {
        present_currency(result)
    } else {
        PresentedResult {
            headline: format_magnitude(result.primary),
            total: plain_line("Total", result.primary),
            breakdown: plain_lines(&result.breakdown),
            derived: plain_lines(&result.derived),
            comparisons: plain_lines(&result.comparisons),
        }
    }
}

fn present_currency(result: &EstimationResult) -> PresentedResult {
    let total_cents = round_cents(result.primary.value);
    let mut cents = result
        .breakdown
        .iter()
        .map(|line| round_cents(line.value.value))
        .collect::<Vec<_>>();

    // Push any residual rounding cent onto the largest line.
    let residual = round_cents(total_cents - cents.iter().sum::<f64>());
    if residual != 0.0 {
        if let Some(idx) = largest_index(&cents) {
            cents[idx] = round_cents(cents[idx] + residual);
        }
    }

    let breakdown = result
        .breakdown
        .iter()
        .zip(cents)
        .map(|(line, value)| PresentedLine {
            label: line.label.clone(),
            value,
            text: format_currency(value),
        })
        .collect();

    PresentedResult {
        headline: format_currency_whole(result.primary.value),
        total: PresentedLine {
            label: "Total".to_string(),
            value: total_cents,
            text: format_currency(total_cents),
        },
        breakdown,
        derived: plain_lines(&result.derived),
        comparisons: plain_lines(&result.comparisons),
    }
}

fn largest_index(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(idx, _)| idx)
}

fn plain_line(label: &str, magnitude: Magnitude) -> PresentedLine {
    let value = if magnitude.unit == Unit::Dollar {
        round_cents(magnitude.value)
    } else {
        magnitude.value
    };
    PresentedLine {
        label: label.to_string(),
        value,
        text: format_magnitude(magnitude),
    }
}

fn plain_lines(lines: &[ResultLine]) -> Vec<PresentedLine> {
    lines
        .iter()
        .map(|line| plain_line(&line.label, line.value))
        .collect()
}
