pub mod brand;
mod compare;
mod error;
mod formula;
pub mod gestation;
pub mod lookup;
mod present;
mod tiered;
mod title;
mod types;
mod units;
mod validate;

pub use compare::{VaryingKey, compare_across, compare_tables, comparison_lines, with_varying};
pub use error::{EstimateError, Result};
pub use formula::{
    FenceInput, FormulaId, FormulaInput, LensInput, LensProfile, LiquorInput, LoadCarriageInput,
    SalesTaxInput, TreeRemovalInput, evaluate, lens_profile,
};
pub use present::{
    PresentedLine, PresentedResult, format_currency, format_currency_whole, format_magnitude,
    format_percent, format_percent_delta, percent_change, present, round_cents, round_whole,
};
pub use tiered::{
    BandCharge, RateBand, RateTable, TieredAmount, TransactionKind, compute_tiered_amount,
};
pub use title::{TitleInput, compare_transactions, estimate_title_premium, rate_table};
pub use types::{CategoryCoefficient, EstimationResult, ResultLine};
pub use units::{Dimension, Magnitude, Unit, convert, pace_to_speed};
pub use validate::parse_or_default;
