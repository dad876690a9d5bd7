//! Raw time series as returned by the data providers.

use chrono::{Datelike, Months, NaiveDate};

/// How the values of a series are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesUnit {
    /// Whole percent, 6.5 means 6.5%.
    Percent,
    /// Decimal fraction, 0.065 means 6.5%.
    Fraction,
    /// Index level or price.
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// `None` when the provider reported a gap or a non-numeric entry.
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// An ascending-by-date sequence of observations for one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub id: String,
    pub unit: SeriesUnit,
    observations: Vec<Observation>,
}

impl RawSeries {
    /// Build a series, sorting the observations ascending by date.
    pub fn new(id: impl Into<String>, unit: SeriesUnit, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self {
            id: id.into(),
            unit,
            observations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations that carry a value, as `(date, value)` pairs.
    pub fn valued(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, f64)> + '_ {
        self.observations
            .iter()
            .filter_map(|o| o.value.map(|v| (o.date, v)))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Valued observations on or after `since`, for trend charts.
    pub fn tail_since(&self, since: NaiveDate) -> Vec<(NaiveDate, f64)> {
        self.valued().filter(|(d, _)| *d >= since).collect()
    }
}

/// Provider-side transformation applied before observations are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Levels,
    /// Percent change from a year ago.
    YearAgoChange,
    /// Compounded annual rate of change.
    AnnualizedChange,
}

/// A macro series request: identifier plus how its values come back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSeriesSpec {
    pub id: String,
    pub transform: Transform,
    pub unit: SeriesUnit,
}

impl MacroSeriesSpec {
    pub fn new(id: impl Into<String>, transform: Transform, unit: SeriesUnit) -> Self {
        Self {
            id: id.into(),
            transform,
            unit,
        }
    }
}

/// A market series request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSeriesSpec {
    pub ticker: String,
    pub unit: SeriesUnit,
}

impl MarketSeriesSpec {
    pub fn new(ticker: impl Into<String>, unit: SeriesUnit) -> Self {
        Self {
            ticker: ticker.into(),
            unit,
        }
    }
}

/// How far back a market request reaches from the as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Months(u32),
    YearToDate,
}

impl Lookback {
    pub fn start_date(self, as_of: NaiveDate) -> NaiveDate {
        match self {
            Lookback::Months(n) => as_of
                .checked_sub_months(Months::new(n))
                .unwrap_or(NaiveDate::MIN),
            Lookback::YearToDate => NaiveDate::from_ymd_opt(as_of.year(), 1, 1).unwrap_or(as_of),
        }
    }
}

/// Coerce a provider string to a number; anything non-numeric is a gap.
pub fn coerce_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
