//! Metric derivation from raw series.
//!
//! All functions are pure. Windowed computations resolve their anchors
//! with calendar-month arithmetic (clamped to month end), and fail with
//! [`DerivationError`] rather than guessing when the data is too thin.

use crate::domain::error::DerivationError;
use crate::domain::reading::Percent;
use crate::domain::series::{RawSeries, SeriesUnit};
use chrono::{Datelike, Months, NaiveDate};

/// Trailing window for the commodity index change.
pub const COMMODITY_WINDOW_MONTHS: u32 = 12;
/// Trailing window for the extended yield-rise comparison.
pub const YIELD_RISE_WINDOW_MONTHS: u32 = 18;
/// Window for the "stuck above threshold" check.
pub const SUSTAINED_WINDOW_MONTHS: u32 = 12;

/// `date` minus `months` calendar months.
pub fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Last chronological observation that carries a value.
pub fn latest_value(series: &RawSeries) -> Result<(NaiveDate, f64), DerivationError> {
    series
        .valued()
        .next_back()
        .ok_or_else(|| DerivationError::EmptySeries {
            series: series.id.clone(),
        })
}

/// Latest value of a rate series, normalized to whole percent.
pub fn latest_rate(series: &RawSeries) -> Result<Percent, DerivationError> {
    let (_, value) = latest_value(series)?;
    match series.unit {
        SeriesUnit::Percent => Ok(Percent::new(value)),
        SeriesUnit::Fraction => Ok(Percent::from_fraction(value)),
        SeriesUnit::Level => Err(DerivationError::UnitMismatch {
            series: series.id.clone(),
        }),
    }
}

/// `(latest / first close of the as-of calendar year - 1) * 100`.
pub fn year_to_date_return(
    series: &RawSeries,
    as_of: NaiveDate,
) -> Result<Percent, DerivationError> {
    let in_year: Vec<(NaiveDate, f64)> = series
        .valued()
        .filter(|(d, _)| d.year() == as_of.year() && *d <= as_of)
        .collect();

    if in_year.len() < 2 {
        return Err(DerivationError::InsufficientData {
            series: series.id.clone(),
            have: in_year.len(),
            need: 2,
        });
    }

    let first = in_year[0].1;
    let last = in_year[in_year.len() - 1].1;
    ratio_change(series, last, first)
}

/// `(latest / value N months before latest - 1) * 100`.
///
/// The anchor is the nearest valued observation dated on or before
/// `latest_date - months`.
pub fn trailing_change(series: &RawSeries, months: u32) -> Result<Percent, DerivationError> {
    let (latest_date, latest) = latest_value(series)?;
    let target = months_back(latest_date, months);

    let anchor = series.valued().filter(|(d, _)| *d <= target).next_back();

    match anchor {
        Some((_, anchor_value)) => ratio_change(series, latest, anchor_value),
        None => Err(DerivationError::AnchorOutOfRange {
            series: series.id.clone(),
            anchor: target,
            earliest: series.first_date().unwrap_or(latest_date),
        }),
    }
}

/// Fed Funds minus Core CPI, both in whole percent.
pub fn real_rate_spread(fed_funds: Percent, core_cpi: Percent) -> Percent {
    fed_funds - core_cpi
}

/// Whether every monthly observation in the trailing window exceeds
/// `threshold`.
///
/// The window is `(latest_date - months, latest_date]` and must hold
/// exactly one valued observation per calendar month.
pub fn sustained_above(
    series: &RawSeries,
    threshold: Percent,
    months: u32,
) -> Result<bool, DerivationError> {
    let latest_date = series.last_date().ok_or_else(|| DerivationError::EmptySeries {
        series: series.id.clone(),
    })?;
    let window_start = months_back(latest_date, months);

    let window: Vec<_> = series
        .observations()
        .iter()
        .filter(|o| o.date > window_start && o.date <= latest_date)
        .collect();

    let irregular = |reason: String| DerivationError::IrregularSeries {
        series: series.id.clone(),
        reason,
    };

    let mut values = Vec::with_capacity(window.len());
    let mut prev_month: Option<i32> = None;
    for obs in &window {
        let value = obs
            .value
            .ok_or_else(|| irregular(format!("missing value on {}", obs.date)))?;
        let month_index = obs.date.year() * 12 + obs.date.month0() as i32;
        if let Some(prev) = prev_month {
            if month_index == prev {
                return Err(irregular(format!(
                    "more than one observation in {}",
                    obs.date.format("%Y-%m")
                )));
            }
            if month_index != prev + 1 {
                return Err(irregular(format!(
                    "gap before {}",
                    obs.date.format("%Y-%m")
                )));
            }
        }
        prev_month = Some(month_index);
        values.push(value);
    }

    if values.len() < months as usize {
        return Err(DerivationError::InsufficientData {
            series: series.id.clone(),
            have: values.len(),
            need: months as usize,
        });
    }

    let rate = |v: f64| match series.unit {
        SeriesUnit::Fraction => Percent::from_fraction(v),
        _ => Percent::new(v),
    };
    let above = values.iter().filter(|v| rate(**v) > threshold).count();
    Ok(above >= months as usize)
}

fn ratio_change(series: &RawSeries, latest: f64, base: f64) -> Result<Percent, DerivationError> {
    if base == 0.0 {
        return Err(DerivationError::InsufficientData {
            series: series.id.clone(),
            have: 0,
            need: 1,
        });
    }
    Ok(Percent::new((latest / base - 1.0) * 100.0))
}
