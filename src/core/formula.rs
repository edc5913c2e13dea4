//! Closed-form estimators.
//!
//! Each [`FormulaInput`] variant is one fixed equation over an immutable input
//! snapshot. Evaluation is pure: the same snapshot always yields the same
//! [`EstimationResult`].

use serde::Serialize;
use tracing::debug;

use super::error::{EstimateError, Result};
use super::lookup::tree_height_class;
use super::present::round_cents;
use super::types::{EstimationResult, ResultLine};
use super::units::{Magnitude, Unit, pace_to_speed};
use super::validate::{
    clamp_non_negative, require_in_range, require_non_negative, require_positive,
};

/// 1 W sustained for one minute, in kilocalories.
pub const KCAL_PER_WATT_MINUTE: f64 = 0.01433;
/// Uncited empirical multiplier on the load ratio; kept for output parity.
pub const HEAVY_LOAD_CORRECTION: f64 = 0.3;
pub const MIN_LENS_THICKNESS_MM: f64 = 1.5;
pub const FENCE_REMOVAL_PER_FOOT: f64 = 4.0;
pub const STUMP_GRINDING_PER_INCH: f64 = 3.0;
pub const STUMP_GRINDING_MINIMUM: f64 = 100.0;
pub const DRINKS_FIRST_HOUR: f64 = 2.0;
pub const DRINKS_PER_EXTRA_HOUR: f64 = 1.0;
pub const BEERS_PER_CASE: f64 = 24.0;
pub const GLASSES_PER_WINE_BOTTLE: f64 = 5.0;
pub const POURS_PER_SPIRITS_BOTTLE: f64 = 16.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormulaId {
    LoadCarriage,
    LensThickness,
    FenceCost,
    ReverseSalesTax,
    TreeRemoval,
    LiquorQuantity,
}

impl FormulaId {
    pub fn name(self) -> &'static str {
        match self {
            FormulaId::LoadCarriage => "load-carriage",
            FormulaId::LensThickness => "lens-thickness",
            FormulaId::FenceCost => "fence-cost",
            FormulaId::ReverseSalesTax => "reverse-sales-tax",
            FormulaId::TreeRemoval => "tree-removal",
            FormulaId::LiquorQuantity => "liquor-quantity",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoadCarriageInput {
    pub body_mass_kg: f64,
    pub load_kg: f64,
    pub speed_mps: f64,
    pub grade_percent: f64,
    pub terrain_factor: f64,
    pub duration_minutes: f64,
}

impl LoadCarriageInput {
    pub fn from_imperial(
        body_weight_lb: f64,
        load_lb: f64,
        pace_min_per_mile: f64,
        grade_percent: f64,
        terrain_factor: f64,
        duration_minutes: f64,
    ) -> Result<Self> {
        Ok(Self {
            body_mass_kg: Magnitude::new(body_weight_lb, Unit::Pound).value_in(Unit::Kilogram)?,
            load_kg: Magnitude::new(load_lb, Unit::Pound).value_in(Unit::Kilogram)?,
            speed_mps: pace_to_speed(pace_min_per_mile),
            grade_percent,
            terrain_factor,
            duration_minutes,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LensInput {
    pub power_diopters: f64,
    pub refractive_index: f64,
    pub lens_width_mm: f64,
    pub frame_pd_mm: f64,
    pub pupillary_distance_mm: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FenceInput {
    pub length_ft: f64,
    pub price_per_ft: f64,
    pub gates: u32,
    pub gate_price: f64,
    pub remove_old: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SalesTaxInput {
    pub total_price: f64,
    pub rate_percent: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeRemovalInput {
    pub height_ft: f64,
    pub dbh_inches: f64,
    pub condition_factor: f64,
    pub stump_grinding: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LiquorInput {
    pub guests: u32,
    pub hours: f64,
    pub beer_share: f64,
    pub wine_share: f64,
    pub spirits_share: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FormulaInput {
    LoadCarriage(LoadCarriageInput),
    LensThickness(LensInput),
    FenceCost(FenceInput),
    ReverseSalesTax(SalesTaxInput),
    TreeRemoval(TreeRemovalInput),
    LiquorQuantity(LiquorInput),
}

impl FormulaInput {
    pub fn formula(&self) -> FormulaId {
        match self {
            FormulaInput::LoadCarriage(_) => FormulaId::LoadCarriage,
            FormulaInput::LensThickness(_) => FormulaId::LensThickness,
            FormulaInput::FenceCost(_) => FormulaId::FenceCost,
            FormulaInput::ReverseSalesTax(_) => FormulaId::ReverseSalesTax,
            FormulaInput::TreeRemoval(_) => FormulaId::TreeRemoval,
            FormulaInput::LiquorQuantity(_) => FormulaId::LiquorQuantity,
        }
    }
}

pub fn evaluate(input: &FormulaInput) -> Result<EstimationResult> {
    let result = match input {
        FormulaInput::LoadCarriage(i) => load_carriage(i),
        FormulaInput::LensThickness(i) => lens_thickness(i),
        FormulaInput::FenceCost(i) => fence_cost(i),
        FormulaInput::ReverseSalesTax(i) => reverse_sales_tax(i),
        FormulaInput::TreeRemoval(i) => tree_removal(i),
        FormulaInput::LiquorQuantity(i) => liquor_quantity(i),
    }?;
    debug!(
        formula = input.formula().name(),
        primary = result.primary.value,
        "formula evaluated"
    );
    Ok(result)
}

/// Pandolf load-carriage equation with the heavy-load correction applied.
///
/// `M = 1.5W + 2(W+L)(L/W)^2 + η(W+L)(1.5V^2 + 0.35VG)`, then
/// `M × (1 + 0.3·L/W)`, converted to kcal over the duration.
pub fn load_carriage(input: &LoadCarriageInput) -> Result<EstimationResult> {
    let w = input.body_mass_kg;
    if !w.is_finite() || w <= 0.0 {
        return Err(EstimateError::InvalidBodyWeight(w));
    }
    let l = require_non_negative("load", input.load_kg)?;
    let v = require_non_negative("speed", input.speed_mps)?;
    let g = require_in_range("grade", input.grade_percent, -45.0..=45.0, "must be between -45 and 45")?;
    let eta = require_positive("terrain factor", input.terrain_factor)?;
    let minutes = require_non_negative("duration", input.duration_minutes)?;

    let load_ratio = l / w;
    let standing = 1.5 * w;
    let load = 2.0 * (w + l) * load_ratio * load_ratio;
    let locomotion = eta * (w + l) * (1.5 * v * v + 0.35 * v * g);
    let raw_watts = standing + load + locomotion;
    let correction = raw_watts * HEAVY_LOAD_CORRECTION * load_ratio;
    let watts = raw_watts + correction;

    let kcal = |term: f64| Magnitude::new(term * KCAL_PER_WATT_MINUTE * minutes, Unit::Kilocalorie);
    let kcal_per_hour = watts * KCAL_PER_WATT_MINUTE * 60.0;

    Ok(EstimationResult::from_breakdown(
        Unit::Kilocalorie,
        vec![
            ResultLine::new("Standing metabolism", kcal(standing)),
            ResultLine::new("Load carriage", kcal(load)),
            ResultLine::new("Locomotion", kcal(locomotion)),
            ResultLine::new("Heavy-load correction", kcal(correction)),
        ],
    )
    .with_derived("Metabolic rate", Magnitude::new(watts, Unit::Watt))
    .with_derived("Calories per hour", Magnitude::new(kcal_per_hour, Unit::Kilocalorie))
    .with_derived("Load ratio", Magnitude::new(load_ratio * 100.0, Unit::Percent))
    .with_derived("Speed", Magnitude::new(v, Unit::MetersPerSecond)))
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LensProfile {
    pub effective_diameter_mm: f64,
    pub sag_mm: f64,
    pub center_mm: f64,
    pub edge_mm: f64,
}

impl LensProfile {
    pub fn thickest_mm(&self) -> f64 {
        self.center_mm.max(self.edge_mm)
    }
}

/// Sagitta estimate of centre and edge thickness.
///
/// The effective diameter widens the lens by the frame/pupil decentration,
/// an uncited rule of thumb kept as-is.
pub fn lens_profile(input: &LensInput) -> Result<LensProfile> {
    let n = input.refractive_index;
    if !n.is_finite() || n <= 1.0 {
        return Err(EstimateError::InvalidRefractiveIndex(n));
    }
    let width = require_positive("lens width", input.lens_width_mm)?;
    let frame_pd = require_non_negative("frame PD", input.frame_pd_mm)?;
    let pd = require_non_negative("pupillary distance", input.pupillary_distance_mm)?;
    let power = input.power_diopters;
    if !power.is_finite() {
        return Err(EstimateError::OutOfRange {
            field: "power",
            value: power,
            reason: "must be finite",
        });
    }

    let effective_diameter_mm = width + (frame_pd - pd).abs();
    let r = effective_diameter_mm / 2.0;
    let sag_mm = (r * r * power.abs()) / (2000.0 * (n - 1.0));

    let (center_mm, edge_mm) = if power < 0.0 {
        (MIN_LENS_THICKNESS_MM, MIN_LENS_THICKNESS_MM + sag_mm)
    } else {
        (MIN_LENS_THICKNESS_MM + sag_mm, MIN_LENS_THICKNESS_MM)
    };

    Ok(LensProfile {
        effective_diameter_mm,
        sag_mm,
        center_mm,
        edge_mm,
    })
}

pub fn lens_thickness(input: &LensInput) -> Result<EstimationResult> {
    let profile = lens_profile(input)?;
    let mm = |value: f64| Magnitude::new(value, Unit::Millimeter);
    Ok(EstimationResult::from_breakdown(
        Unit::Millimeter,
        vec![
            ResultLine::new("Minimum thickness", mm(MIN_LENS_THICKNESS_MM)),
            ResultLine::new("Sagitta", mm(profile.sag_mm)),
        ],
    )
    .with_derived("Center thickness", mm(profile.center_mm))
    .with_derived("Edge thickness", mm(profile.edge_mm))
    .with_derived("Effective diameter", mm(profile.effective_diameter_mm)))
}

pub fn fence_cost(input: &FenceInput) -> Result<EstimationResult> {
    let length = require_non_negative("fence length", input.length_ft)?;
    let price_per_ft = clamp_non_negative(input.price_per_ft);
    let gate_price = clamp_non_negative(input.gate_price);

    let fence = length * price_per_ft;
    let gates = f64::from(input.gates) * gate_price;
    let removal = if input.remove_old {
        length * FENCE_REMOVAL_PER_FOOT
    } else {
        0.0
    };

    let result = EstimationResult::from_breakdown(
        Unit::Dollar,
        vec![
            ResultLine::new("Fence materials and installation", Magnitude::dollars(fence)),
            ResultLine::new("Gates", Magnitude::dollars(gates)),
            ResultLine::new("Old fence removal", Magnitude::dollars(removal)),
        ],
    );
    let per_foot = if length > 0.0 {
        result.primary.value / length
    } else {
        0.0
    };
    Ok(result.with_derived("Cost per linear foot", Magnitude::dollars(per_foot)))
}

/// Splits a tax-inclusive total into pre-tax price and tax, both to the cent,
/// so that the two always add back to the total.
pub fn reverse_sales_tax(input: &SalesTaxInput) -> Result<EstimationResult> {
    let total = clamp_non_negative(input.total_price);
    let rate = require_in_range("tax rate", input.rate_percent, 0.0..=100.0, "must be between 0 and 100")?;

    let pre_tax = round_cents(total / (1.0 + rate / 100.0));
    let tax = round_cents(total - pre_tax);

    Ok(EstimationResult::from_breakdown(
        Unit::Dollar,
        vec![
            ResultLine::new("Pre-tax price", Magnitude::dollars(pre_tax)),
            ResultLine::new("Sales tax", Magnitude::dollars(tax)),
        ],
    )
    .with_derived("Tax rate", Magnitude::new(rate, Unit::Percent)))
}

pub fn tree_removal(input: &TreeRemovalInput) -> Result<EstimationResult> {
    let height = require_positive("tree height", input.height_ft)?;
    let dbh = require_non_negative("trunk diameter", input.dbh_inches)?;
    let multiplier = require_positive("condition factor", input.condition_factor)?;

    let class = tree_height_class(height);
    let base = class.coefficient;
    let adjustment = base * (multiplier - 1.0);
    let stump = if input.stump_grinding {
        (dbh * STUMP_GRINDING_PER_INCH).max(STUMP_GRINDING_MINIMUM)
    } else {
        0.0
    };

    Ok(EstimationResult::from_breakdown(
        Unit::Dollar,
        vec![
            ResultLine::new(format!("Base removal ({})", class.label), Magnitude::dollars(base)),
            ResultLine::new("Condition adjustment", Magnitude::dollars(adjustment)),
            ResultLine::new("Stump grinding", Magnitude::dollars(stump)),
        ],
    )
    .with_derived("Condition multiplier", Magnitude::new(multiplier, Unit::Ratio)))
}

pub fn liquor_quantity(input: &LiquorInput) -> Result<EstimationResult> {
    let guests = require_positive("guests", f64::from(input.guests))?;
    let hours = require_in_range("hours", input.hours, 1.0..=24.0, "must be between 1 and 24")?;
    let beer = require_non_negative("beer share", input.beer_share)?;
    let wine = require_non_negative("wine share", input.wine_share)?;
    let spirits = require_non_negative("spirits share", input.spirits_share)?;
    let share_total = require_positive("drink shares total", beer + wine + spirits)?;

    let drinks = guests * (DRINKS_FIRST_HOUR + (hours - 1.0) * DRINKS_PER_EXTRA_HOUR);
    let beer_drinks = drinks * beer / share_total;
    let wine_drinks = drinks * wine / share_total;
    let spirits_drinks = drinks * spirits / share_total;

    let count = |value: f64| Magnitude::new(value, Unit::Count);
    Ok(EstimationResult::from_breakdown(
        Unit::Count,
        vec![
            ResultLine::new("Beer servings", count(beer_drinks)),
            ResultLine::new("Wine servings", count(wine_drinks)),
            ResultLine::new("Spirits servings", count(spirits_drinks)),
        ],
    )
    .with_derived("Beer cases", count((beer_drinks / BEERS_PER_CASE).ceil()))
    .with_derived("Wine bottles", count((wine_drinks / GLASSES_PER_WINE_BOTTLE).ceil()))
    .with_derived("Spirits bottles", count((spirits_drinks / POURS_PER_SPIRITS_BOTTLE).ceil())))
}
