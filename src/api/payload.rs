//! Request payloads. Every field is optional; missing fields take the
//! documented defaults below, and numeric text that fails to parse counts
//! as zero.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::core::brand::{BrandSpec, FrameShape, MarkModifier};
use crate::core::gestation::parse_date;
use crate::core::lookup::{
    FENCE_MATERIALS, LENS_INDICES, STATE_SALES_TAX, TERRAINS, TREE_CONDITIONS, Terrain,
    default_fence_material, find, resolve,
};
use crate::core::{
    CategoryCoefficient, EstimateError, FenceInput, FormulaInput, LensInput, LiquorInput,
    LoadCarriageInput, SalesTaxInput, TitleInput, TransactionKind, TreeRemovalInput,
    parse_or_default,
};

const NO_SALES_TAX: CategoryCoefficient =
    CategoryCoefficient::new("none", 0.0, "No sales tax", "Unknown or untaxed state");

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts JSON numbers and numeric text. Blank text is treated as missing.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrText::Number(v)) => Some(v),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => None,
        Some(NumberOrText::Text(text)) => Some(parse_or_default(&text, 0.0)),
    })
}

/// Counts: fractional values round to the nearest whole, negatives become 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.map(|value| {
        if value.is_finite() && value > 0.0 {
            value.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrText {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// Checkbox-style flags. Unrecognised text is off; blank is missing.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FlagOrText>::deserialize(deserializer)? {
        None => None,
        Some(FlagOrText::Flag(flag)) => Some(flag),
        Some(FlagOrText::Number(value)) => Some(value != 0.0),
        Some(FlagOrText::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "true" | "1" | "yes" | "on" => Some(true),
            _ => Some(false),
        },
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitlePayload {
    #[serde(deserialize_with = "lenient_number")]
    pub purchase_price: Option<f64>,
    pub transaction: Option<TransactionKind>,
    #[serde(deserialize_with = "lenient_flag")]
    pub enhanced: Option<bool>,
}

impl TitlePayload {
    pub fn into_input(self) -> TitleInput {
        TitleInput {
            purchase_price: self.purchase_price.unwrap_or(300_000.0),
            kind: self.transaction.unwrap_or(TransactionKind::Sale),
            enhanced: self.enhanced.unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuckPayload {
    #[serde(deserialize_with = "lenient_number")]
    pub body_weight: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub load: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub pace: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub grade: Option<f64>,
    pub terrain: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub duration: Option<f64>,
    #[serde(deserialize_with = "lenient_flag")]
    pub compare_terrains: Option<bool>,
}

impl RuckPayload {
    pub fn compare(&self) -> bool {
        self.compare_terrains.unwrap_or(false)
    }

    pub fn into_input(self) -> Result<FormulaInput, EstimateError> {
        let terrain = Terrain::from_key(self.terrain.as_deref().unwrap_or("paved"));
        let input = LoadCarriageInput::from_imperial(
            self.body_weight.unwrap_or(180.0),
            self.load.unwrap_or(35.0),
            self.pace.unwrap_or(15.0),
            self.grade.unwrap_or(0.0),
            terrain.coefficient(),
            self.duration.unwrap_or(60.0),
        )?;
        Ok(FormulaInput::LoadCarriage(input))
    }

    pub fn candidates() -> &'static [CategoryCoefficient] {
        TERRAINS
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LensPayload {
    #[serde(deserialize_with = "lenient_number")]
    pub power: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub refractive_index: Option<f64>,
    /// Lens index table key such as `"1.67"`; overridden by `refractiveIndex`.
    pub material: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub lens_width: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub frame_pd: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub pd: Option<f64>,
}

impl LensPayload {
    pub fn into_input(self) -> FormulaInput {
        let material = self
            .material
            .as_deref()
            .and_then(|key| find(LENS_INDICES, key))
            .map(|row| row.coefficient);
        FormulaInput::LensThickness(LensInput {
            power_diopters: self.power.unwrap_or(-4.0),
            refractive_index: self.refractive_index.or(material).unwrap_or(1.5),
            lens_width_mm: self.lens_width.unwrap_or(52.0),
            frame_pd_mm: self.frame_pd.unwrap_or(70.0),
            pupillary_distance_mm: self.pd.unwrap_or(64.0),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FencePayload {
    #[serde(deserialize_with = "lenient_number")]
    pub length: Option<f64>,
    pub material: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub price_per_foot: Option<f64>,
    #[serde(deserialize_with = "lenient_count")]
    pub gates: Option<u32>,
    #[serde(deserialize_with = "lenient_number")]
    pub gate_price: Option<f64>,
    #[serde(deserialize_with = "lenient_flag")]
    pub remove_old: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub compare_materials: Option<bool>,
}

impl FencePayload {
    pub fn compare(&self) -> bool {
        self.compare_materials.unwrap_or(true)
    }

    pub fn into_input(self) -> FormulaInput {
        let material = resolve(
            FENCE_MATERIALS,
            self.material.as_deref().unwrap_or(""),
            default_fence_material(),
        );
        FormulaInput::FenceCost(FenceInput {
            length_ft: self.length.unwrap_or(150.0),
            price_per_ft: self.price_per_foot.unwrap_or(material.coefficient),
            gates: self.gates.unwrap_or(1),
            gate_price: self.gate_price.unwrap_or(350.0),
            remove_old: self.remove_old.unwrap_or(false),
        })
    }

    pub fn candidates() -> &'static [CategoryCoefficient] {
        FENCE_MATERIALS
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesTaxPayload {
    #[serde(deserialize_with = "lenient_number")]
    pub total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub rate: Option<f64>,
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub compare_states: Option<bool>,
}

impl SalesTaxPayload {
    pub fn compare(&self) -> bool {
        self.compare_states.unwrap_or(false)
    }

    pub fn into_input(self) -> FormulaInput {
        let rate = match (self.rate, self.state.as_deref()) {
            (Some(rate), _) => rate,
            (None, Some(code)) => state_rate(code),
            (None, None) => 7.5,
        };
        FormulaInput::ReverseSalesTax(SalesTaxInput {
            total_price: self.total.unwrap_or(107.5),
            rate_percent: rate,
        })
    }

    pub fn candidates() -> &'static [CategoryCoefficient] {
        STATE_SALES_TAX
    }
}

/// Base rate for a two-letter state code; unknown codes are untaxed.
pub fn state_rate(code: &str) -> f64 {
    let code = code.trim().to_ascii_uppercase();
    resolve(STATE_SALES_TAX, &code, &NO_SALES_TAX).coefficient
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreePayload {
    #[serde(deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub dbh: Option<f64>,
    pub condition: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub stump_grinding: Option<bool>,
}

impl TreePayload {
    pub fn into_input(self) -> FormulaInput {
        let neutral = CategoryCoefficient::neutral();
        let condition = resolve(
            TREE_CONDITIONS,
            self.condition.as_deref().unwrap_or("healthy"),
            &neutral,
        )
        .coefficient;
        FormulaInput::TreeRemoval(TreeRemovalInput {
            height_ft: self.height.unwrap_or(45.0),
            dbh_inches: self.dbh.unwrap_or(20.0),
            condition_factor: condition,
            stump_grinding: self.stump_grinding.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiquorPayload {
    #[serde(deserialize_with = "lenient_count")]
    pub guests: Option<u32>,
    #[serde(deserialize_with = "lenient_number")]
    pub hours: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub beer: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub wine: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub spirits: Option<f64>,
}

impl LiquorPayload {
    pub fn into_input(self) -> FormulaInput {
        FormulaInput::LiquorQuantity(LiquorInput {
            guests: self.guests.unwrap_or(100),
            hours: self.hours.unwrap_or(5.0),
            beer_share: self.beer.unwrap_or(50.0),
            wine_share: self.wine.unwrap_or(30.0),
            spirits_share: self.spirits.unwrap_or(20.0),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestationPayload {
    pub lmp: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub cycle_days: Option<u32>,
    pub reference_date: Option<String>,
}

impl GestationPayload {
    pub fn dates(&self) -> Result<(NaiveDate, u32, NaiveDate), EstimateError> {
        let lmp = match self.lmp.as_deref() {
            Some(text) => parse_date(text)?,
            None => {
                return Err(EstimateError::InvalidDate(
                    "lmp is required (YYYY-MM-DD)".to_string(),
                ));
            }
        };
        let reference = match self.reference_date.as_deref() {
            Some(text) => parse_date(text)?,
            None => Local::now().date_naive(),
        };
        Ok((lmp, self.cycle_days.unwrap_or(28), reference))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandPayload {
    pub mark: Option<String>,
    pub frame: Option<FrameShape>,
    pub modifier: Option<MarkModifier>,
}

impl BrandPayload {
    pub fn into_spec(self) -> BrandSpec {
        BrandSpec {
            mark: self.mark.unwrap_or_default(),
            frame: self.frame.unwrap_or_default(),
            modifier: self.modifier.unwrap_or_default(),
        }
    }
}
