//! Pennsylvania-style title insurance premiums.

use super::compare::compare_tables;
use super::error::Result;
use super::present::format_currency_whole;
use super::tiered::{RateBand, RateTable, TransactionKind, compute_tiered_amount};
use super::types::{EstimationResult, ResultLine};
use super::units::{Magnitude, Unit};
use super::validate::clamp_non_negative;

pub const ENHANCED_COVERAGE_RATE: f64 = 0.10;

const SALE_BANDS: [RateBand; 8] = [
    RateBand::flat(30_000.0, 569.0),
    RateBand::rate(30_000.0, Some(45_000.0), 7.41),
    RateBand::rate(45_000.0, Some(100_000.0), 6.27),
    RateBand::rate(100_000.0, Some(500_000.0), 5.23),
    RateBand::rate(500_000.0, Some(1_000_000.0), 4.56),
    RateBand::rate(1_000_000.0, Some(2_000_000.0), 3.99),
    RateBand::rate(2_000_000.0, Some(7_000_000.0), 3.42),
    RateBand::rate(7_000_000.0, None, 2.85),
];

const REFINANCE_BANDS: [RateBand; 8] = [
    RateBand::flat(30_000.0, 484.0),
    RateBand::rate(30_000.0, Some(45_000.0), 6.30),
    RateBand::rate(45_000.0, Some(100_000.0), 5.33),
    RateBand::rate(100_000.0, Some(500_000.0), 4.45),
    RateBand::rate(500_000.0, Some(1_000_000.0), 3.88),
    RateBand::rate(1_000_000.0, Some(2_000_000.0), 3.39),
    RateBand::rate(2_000_000.0, Some(7_000_000.0), 2.91),
    RateBand::rate(7_000_000.0, None, 2.42),
];

pub fn rate_table(kind: TransactionKind) -> RateTable {
    let bands = match kind {
        TransactionKind::Sale => SALE_BANDS,
        TransactionKind::Refinance => REFINANCE_BANDS,
    };
    RateTable::new(kind, bands.to_vec()).expect("built-in rate tables are contiguous")
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TitleInput {
    pub purchase_price: f64,
    pub kind: TransactionKind,
    pub enhanced: bool,
}

/// Base premium from the tiered schedule plus the optional enhanced add-on.
/// Negative prices are treated as zero.
pub fn estimate_title_premium(input: &TitleInput) -> Result<EstimationResult> {
    let price = clamp_non_negative(input.purchase_price);
    let table = rate_table(input.kind);
    let tiered = compute_tiered_amount(price, &table);
    let add_on = enhanced_add_on(tiered.total, input.enhanced);

    let mut result = EstimationResult::from_breakdown(
        Unit::Dollar,
        vec![
            ResultLine::new("Base premium", Magnitude::dollars(tiered.total)),
            ResultLine::new("Enhanced coverage", Magnitude::dollars(add_on)),
        ],
    );
    for band in &tiered.per_band {
        let label = match band.upper_bound {
            Some(upper) => format!(
                "Band {}-{}",
                format_currency_whole(band.lower_bound),
                format_currency_whole(upper)
            ),
            None => format!("Band over {}", format_currency_whole(band.lower_bound)),
        };
        result = result.with_derived(label, Magnitude::dollars(band.charge));
    }
    Ok(result)
}

fn enhanced_add_on(base_premium: f64, enhanced: bool) -> f64 {
    if enhanced {
        base_premium * ENHANCED_COVERAGE_RATE
    } else {
        0.0
    }
}

/// The same price run through every transaction table.
pub fn compare_transactions(purchase_price: f64, enhanced: bool) -> Vec<ResultLine> {
    let kinds = [TransactionKind::Sale, TransactionKind::Refinance];
    let tables = kinds.map(rate_table);
    kinds
        .iter()
        .zip(compare_tables(clamp_non_negative(purchase_price), &tables))
        .map(|(kind, tiered)| {
            let premium = tiered.total + enhanced_add_on(tiered.total, enhanced);
            ResultLine::new(kind.label(), Magnitude::dollars(premium))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::present::{present, round_cents};
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sale(price: f64, enhanced: bool) -> EstimationResult {
        estimate_title_premium(&TitleInput {
            purchase_price: price,
            kind: TransactionKind::Sale,
            enhanced,
        })
        .expect("title estimate")
    }

    #[test]
    fn built_in_tables_validate() {
        assert_eq!(rate_table(TransactionKind::Sale).bands().len(), 8);
        assert_eq!(rate_table(TransactionKind::Refinance).kind(), TransactionKind::Refinance);
    }

    #[test]
    fn oracle_three_hundred_thousand_sale() {
        let base = sale(300_000.0, false);
        assert_approx_tol(base.primary.value, 2_070.0, 2.0);
        assert_approx_tol(base.primary.value, 569.0 + 111.15 + 344.85 + 1_046.0, 1e-9);

        let enhanced = sale(300_000.0, true);
        assert_approx_tol(enhanced.primary.value, 2_277.0, 2.0);
        assert_approx_tol(enhanced.breakdown_value("Enhanced coverage").unwrap(), 207.1, 1e-9);
    }

    #[test]
    fn band_boundaries() {
        assert_approx_tol(sale(30_000.0, false).primary.value, 569.0, 1e-12);
        assert_approx_tol(sale(30_001.0, false).primary.value, 569.0 + 7.41 / 1000.0, 1e-9);
        assert_approx_tol(sale(-100.0, false).primary.value, 0.0, 1e-12);
    }

    #[test]
    fn refinance_is_cheaper_than_sale() {
        let lines = compare_transactions(300_000.0, false);
        assert_eq!(lines[0].label, "Sale");
        assert_eq!(lines[1].label, "Refinance");
        assert!(lines[1].value.value < lines[0].value.value);
    }

    #[test]
    fn transaction_comparison_matches_full_estimate() {
        for enhanced in [false, true] {
            let lines = compare_transactions(300_000.0, enhanced);
            assert_approx_tol(lines[0].value.value, sale(300_000.0, enhanced).primary.value, 1e-9);
            let refinance = estimate_title_premium(&TitleInput {
                purchase_price: 300_000.0,
                kind: TransactionKind::Refinance,
                enhanced,
            })
            .expect("title estimate");
            assert_approx_tol(lines[1].value.value, refinance.primary.value, 1e-9);
        }
        let clamped = compare_transactions(-5.0, true);
        assert!(clamped.iter().all(|line| line.value.value == 0.0));
    }

    #[test]
    fn derived_band_lines_match_base_premium() {
        let result = sale(750_000.0, false);
        let bands: f64 = result.derived.iter().map(|l| l.value.value).sum();
        assert_approx_tol(bands, result.breakdown_value("Base premium").unwrap(), 1e-9);
        assert_eq!(result.derived[0].label, "Band $0-$30,000");
        assert_eq!(result.derived[3].label, "Band $100,000-$500,000");
    }

    proptest! {
        #[test]
        fn prop_presented_breakdown_sums_to_total(price in 0.0f64..10_000_000.0, enhanced in proptest::bool::ANY) {
            let result = sale(price, enhanced);
            prop_assert!((result.breakdown_total() - result.primary.value).abs() <= 0.01);
            let shown = present(&result);
            let sum: f64 = shown.breakdown.iter().map(|l| l.value).sum();
            prop_assert!((sum - shown.total.value).abs() <= 0.01);
            prop_assert!((shown.total.value - round_cents(result.primary.value)).abs() <= 1e-9);
        }
    }
}
