//! Pregnancy dating from the last menstrual period (LMP).

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::error::{EstimateError, Result};

pub const TYPICAL_CYCLE_DAYS: u32 = 28;
pub const PREGNANCY_DAYS: u64 = 280;
pub const OVULATION_DAY: u64 = 14;
pub const MAX_TRACKED_WEEKS: i64 = 44;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GestationalAge {
    pub weeks: i64,
    pub days: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GestationEstimate {
    pub due_date: NaiveDate,
    pub conception_date: NaiveDate,
    pub gestational_age: GestationalAge,
    pub trimester: u8,
    pub days_remaining: i64,
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| EstimateError::InvalidDate(format!("{text}: {e}")))
}

/// Naegele's rule, shifted by how far the cycle length differs from 28 days.
/// Gestational age is counted from the LMP, not from conception.
pub fn estimate_gestation(
    lmp: NaiveDate,
    cycle_days: u32,
    reference: NaiveDate,
) -> Result<GestationEstimate> {
    if !(20..=45).contains(&cycle_days) {
        return Err(EstimateError::OutOfRange {
            field: "cycle length",
            value: f64::from(cycle_days),
            reason: "must be between 20 and 45 days",
        });
    }

    let elapsed = (reference - lmp).num_days();
    if elapsed < 0 {
        return Err(EstimateError::InvalidDate(
            "reference date is before the last menstrual period".to_string(),
        ));
    }
    if elapsed > MAX_TRACKED_WEEKS * 7 {
        return Err(EstimateError::InvalidDate(format!(
            "last menstrual period is more than {MAX_TRACKED_WEEKS} weeks before the reference date"
        )));
    }

    let due_date = shift(lmp, PREGNANCY_DAYS as i64 + cycle_offset(cycle_days))?;
    let conception_date = shift(lmp, OVULATION_DAY as i64 + cycle_offset(cycle_days))?;

    let gestational_age = GestationalAge {
        weeks: elapsed / 7,
        days: elapsed % 7,
    };
    let trimester = match gestational_age.weeks {
        w if w < 14 => 1,
        w if w < 28 => 2,
        _ => 3,
    };

    Ok(GestationEstimate {
        due_date,
        conception_date,
        gestational_age,
        trimester,
        days_remaining: (due_date - reference).num_days(),
    })
}

fn cycle_offset(cycle_days: u32) -> i64 {
    i64::from(cycle_days) - i64::from(TYPICAL_CYCLE_DAYS)
}

fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| EstimateError::InvalidDate(format!("{date} shifted by {days} days")))
}
