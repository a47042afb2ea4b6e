//! Pregnancy dating: LMP to EDD (Naegele's rule) and the current
//! gestational week.
//!
//! The due date uses calendar-aware month/year arithmetic, not a flat
//! 280-day offset; the two can differ by a day or two depending on month
//! lengths. The week computation assumes the 40-week model and clamps to
//! the clinically tracked range.

use chrono::{Days, Months, NaiveDate};

/// Gestational weeks are clamped to this closed interval.
pub const GESTATION_WEEK_RANGE: (i64, i64) = (1, 42);

/// Full term in the 40-week model.
const TERM_WEEKS: i64 = 40;

#[derive(Debug, thiserror::Error)]
pub enum DatingError {
    #[error("Invalid Last Menstrual Period (LMP) date: {0}")]
    InvalidLmp(String),
    #[error("Invalid date: {0}")]
    Unparseable(String),
}

/// Estimated due date from the last menstrual period, by Naegele's rule:
/// add 7 days, subtract 3 calendar months, add 1 calendar year.
pub fn compute_edd(lmp: NaiveDate) -> Result<NaiveDate, DatingError> {
    lmp.checked_add_days(Days::new(7))
        .and_then(|d| d.checked_sub_months(Months::new(3)))
        .and_then(|d| d.checked_add_months(Months::new(12)))
        .ok_or_else(|| DatingError::InvalidLmp(lmp.to_string()))
}

/// Current gestational week for a patient with the given due date.
///
/// weeks-until-due is the ceiling of the day distance over 7, so the week
/// advances the moment a new 7-day block toward the due date begins. The
/// result is clamped to [1, 42]: far before conception reads as week 1,
/// long past the due date as week 42.
pub fn gestational_week(edd: NaiveDate, today: NaiveDate) -> u32 {
    let days_until_due = (edd - today).num_days();
    let weeks_until_due = (days_until_due as f64 / 7.0).ceil() as i64;
    let (min, max) = GESTATION_WEEK_RANGE;
    (TERM_WEEKS - weeks_until_due).clamp(min, max) as u32
}

/// Parse a `YYYY-MM-DD` calendar date from client input.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatingError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DatingError::Unparseable(s.to_string()))
}
