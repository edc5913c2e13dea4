use super::error::{EstimateError, Result};
use super::formula::{FormulaInput, evaluate};
use super::tiered::{RateTable, TieredAmount, compute_tiered_amount};
use super::types::{CategoryCoefficient, EstimationResult, ResultLine};

/// The input field a comparison substitutes with each candidate coefficient.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VaryingKey {
    TerrainFactor,
    RefractiveIndex,
    MaterialPrice,
    TaxRate,
    ConditionFactor,
}

impl VaryingKey {
    pub fn name(self) -> &'static str {
        match self {
            VaryingKey::TerrainFactor => "terrain factor",
            VaryingKey::RefractiveIndex => "refractive index",
            VaryingKey::MaterialPrice => "material price",
            VaryingKey::TaxRate => "tax rate",
            VaryingKey::ConditionFactor => "condition factor",
        }
    }
}

/// Returns a copy of `base` with the field named by `key` set to `value`.
pub fn with_varying(base: &FormulaInput, key: VaryingKey, value: f64) -> Result<FormulaInput> {
    let mut input = *base;
    match (&mut input, key) {
        (FormulaInput::LoadCarriage(i), VaryingKey::TerrainFactor) => i.terrain_factor = value,
        (FormulaInput::LensThickness(i), VaryingKey::RefractiveIndex) => i.refractive_index = value,
        (FormulaInput::FenceCost(i), VaryingKey::MaterialPrice) => i.price_per_ft = value,
        (FormulaInput::ReverseSalesTax(i), VaryingKey::TaxRate) => i.rate_percent = value,
        (FormulaInput::TreeRemoval(i), VaryingKey::ConditionFactor) => i.condition_factor = value,
        _ => {
            return Err(EstimateError::UnsupportedVaryingKey {
                key: key.name(),
                formula: base.formula().name(),
            });
        }
    }
    Ok(input)
}

/// Re-evaluates `base` once per candidate, holding every other input fixed.
/// Output order follows `candidates`.
pub fn compare_across(
    base: &FormulaInput,
    key: VaryingKey,
    candidates: &[CategoryCoefficient],
) -> Result<Vec<EstimationResult>> {
    candidates
        .iter()
        .map(|candidate| evaluate(&with_varying(base, key, candidate.coefficient)?))
        .collect()
}

/// Headline values of a comparison run, labelled by candidate.
pub fn comparison_lines(
    candidates: &[CategoryCoefficient],
    results: &[EstimationResult],
) -> Vec<ResultLine> {
    candidates
        .iter()
        .zip(results)
        .map(|(candidate, result)| ResultLine::new(candidate.label, result.primary))
        .collect()
}

pub fn compare_tables(magnitude: f64, tables: &[RateTable]) -> Vec<TieredAmount> {
    tables
        .iter()
        .map(|table| compute_tiered_amount(magnitude, table))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formula::tests::{sample_lens, sample_ruck};
    use crate::core::formula::{FenceInput, SalesTaxInput};
    use crate::core::lookup::{FENCE_MATERIALS, LENS_INDICES, STATE_SALES_TAX, TERRAINS};
    use crate::core::tiered::tests::sample_table;

    #[test]
    fn lens_comparison_preserves_candidate_order_and_thins_out() {
        let base = FormulaInput::LensThickness(sample_lens());
        let results = compare_across(&base, VaryingKey::RefractiveIndex, LENS_INDICES).unwrap();
        assert_eq!(results.len(), LENS_INDICES.len());
        for pair in results.windows(2) {
            assert!(pair[1].primary.value < pair[0].primary.value);
        }
        let direct = evaluate(&base).unwrap();
        assert_eq!(results[0], direct);
    }

    #[test]
    fn comparison_reflects_latest_base_inputs() {
        let mut lens = sample_lens();
        let first = compare_across(
            &FormulaInput::LensThickness(lens),
            VaryingKey::RefractiveIndex,
            LENS_INDICES,
        )
        .unwrap();
        lens.power_diopters = -8.0;
        let second = compare_across(
            &FormulaInput::LensThickness(lens),
            VaryingKey::RefractiveIndex,
            LENS_INDICES,
        )
        .unwrap();
        for (a, b) in first.iter().zip(&second) {
            assert!(b.primary.value > a.primary.value);
        }
    }

    #[test]
    fn terrain_comparison_is_ordered_by_table() {
        let base = FormulaInput::LoadCarriage(sample_ruck());
        let results = compare_across(&base, VaryingKey::TerrainFactor, TERRAINS).unwrap();
        let lines = comparison_lines(TERRAINS, &results);
        assert_eq!(lines[0].label, "Paved / treadmill");
        assert_eq!(lines.last().unwrap().label, "Loose sand");
        assert!(lines.last().unwrap().value.value > lines[0].value.value);
    }

    #[test]
    fn fence_and_state_comparisons() {
        let fence = FormulaInput::FenceCost(FenceInput {
            length_ft: 100.0,
            price_per_ft: 0.0,
            gates: 0,
            gate_price: 0.0,
            remove_old: false,
        });
        let results = compare_across(&fence, VaryingKey::MaterialPrice, FENCE_MATERIALS).unwrap();
        assert_eq!(results[0].primary.value, 1_500.0);

        let tax = FormulaInput::ReverseSalesTax(SalesTaxInput {
            total_price: 100.0,
            rate_percent: 0.0,
        });
        let results = compare_across(&tax, VaryingKey::TaxRate, STATE_SALES_TAX).unwrap();
        assert_eq!(results.len(), 51);
        assert!(results.iter().all(|r| (r.primary.value - 100.0).abs() <= 0.005));
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let base = FormulaInput::LoadCarriage(sample_ruck());
        let err = compare_across(&base, VaryingKey::RefractiveIndex, LENS_INDICES)
            .expect_err("lens index does not apply to rucking");
        assert_eq!(
            err,
            EstimateError::UnsupportedVaryingKey {
                key: "refractive index",
                formula: "load-carriage",
            }
        );
    }

    #[test]
    fn empty_candidate_list_yields_empty_comparison() {
        let base = FormulaInput::LensThickness(sample_lens());
        assert!(compare_across(&base, VaryingKey::RefractiveIndex, &[]).unwrap().is_empty());
    }

    #[test]
    fn table_comparison_runs_every_table() {
        let tables = vec![sample_table(), sample_table()];
        let amounts = compare_tables(30_000.0, &tables);
        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[0].total, 569.0);
    }
}
