#![allow(dead_code)]

use chrono::{Datelike, Months, NaiveDate};
use stagwatch::domain::error::FetchError;
use stagwatch::domain::series::{
    Lookback, MacroSeriesSpec, MarketSeriesSpec, Observation, RawSeries, SeriesUnit,
};
use stagwatch::ports::macro_port::MacroDataPort;
use stagwatch::ports::market_port::MarketDataPort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn as_of() -> NaiveDate {
    date(2025, 8, 29)
}

/// One observation on the first of each month, ending at `last_month`.
pub fn monthly(id: &str, unit: SeriesUnit, last_month: NaiveDate, values: &[f64]) -> RawSeries {
    let last = date(last_month.year(), last_month.month(), 1);
    let n = values.len() as u32;
    let observations = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let back = n - 1 - i as u32;
            Observation::new(last.checked_sub_months(Months::new(back)).unwrap(), *v)
        })
        .collect();
    RawSeries::new(id, unit, observations)
}

pub fn closes(id: &str, unit: SeriesUnit, points: &[(NaiveDate, f64)]) -> RawSeries {
    RawSeries::new(
        id,
        unit,
        points.iter().map(|(d, v)| Observation::new(*d, *v)).collect(),
    )
}

pub struct MockMacroPort {
    pub data: HashMap<String, RawSeries>,
    pub errors: HashMap<String, FetchError>,
    pub calls: Cell<usize>,
    pub requests: RefCell<Vec<(String, Option<NaiveDate>)>>,
}

impl MockMacroPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, series: RawSeries) -> Self {
        self.data.insert(series.id.clone(), series);
        self
    }

    pub fn with_error(mut self, id: &str, error: FetchError) -> Self {
        self.errors.insert(id.to_string(), error);
        self
    }

    /// CPI 3.1, GDP 3.0, unemployment 4.2, Fed Funds 5.33 at the latest month.
    pub fn calm() -> Self {
        let last = date(2025, 7, 1);
        Self::new()
            .with_series(monthly("CPILFESL", SeriesUnit::Percent, last, &[3.2, 3.1, 3.1]))
            .with_series(monthly("GDPC1", SeriesUnit::Percent, date(2025, 4, 1), &[-0.5, 3.0]))
            .with_series(monthly("UNRATE", SeriesUnit::Percent, last, &[4.1, 4.1, 4.2]))
            .with_series(monthly("FEDFUNDS", SeriesUnit::Percent, last, &[5.33, 5.33, 5.33]))
    }
}

impl MacroDataPort for MockMacroPort {
    fn fetch_series(
        &self,
        spec: &MacroSeriesSpec,
        observation_start: Option<NaiveDate>,
    ) -> Result<RawSeries, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.requests
            .borrow_mut()
            .push((spec.id.clone(), observation_start));

        if let Some(err) = self.errors.get(&spec.id) {
            return Err(err.clone());
        }
        self.data
            .get(&spec.id)
            .cloned()
            .ok_or_else(|| FetchError::Empty {
                series: spec.id.clone(),
            })
    }
}

pub struct MockMarketPort {
    pub data: HashMap<String, RawSeries>,
    pub errors: HashMap<String, FetchError>,
    pub calls: Cell<usize>,
    pub requests: RefCell<Vec<(String, Lookback)>>,
}

impl MockMarketPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, series: RawSeries) -> Self {
        self.data.insert(series.id.clone(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, error: FetchError) -> Self {
        self.errors.insert(ticker.to_string(), error);
        self
    }

    /// 10-year at 4.23, equities +10% YTD, commodities flat, with the
    /// commodity index closing at `crb_latest` against 200 a year earlier.
    pub fn with_crb(crb_latest: f64) -> Self {
        Self::new()
            .with_series(monthly(
                "^TNX",
                SeriesUnit::Percent,
                as_of(),
                &[
                    3.9, 3.95, 4.0, 4.05, 4.1, 4.15, 4.2, 4.25, 4.3, 4.35, 4.4, 4.45, 4.5, 4.45,
                    4.4, 4.35, 4.3, 4.25, 4.2, 4.15, 4.2, 4.25, 4.2, 4.23,
                ],
            ))
            .with_series(closes(
                "^GSPC",
                SeriesUnit::Level,
                &[
                    (date(2024, 12, 31), 5881.63),
                    (date(2025, 1, 2), 5000.0),
                    (date(2025, 8, 29), 5500.0),
                ],
            ))
            .with_series(closes(
                "^CRB",
                SeriesUnit::Level,
                &[
                    (date(2024, 3, 1), 190.0),
                    (date(2024, 8, 1), 200.0),
                    (date(2025, 8, 29), crb_latest),
                ],
            ))
    }

    pub fn calm() -> Self {
        Self::with_crb(204.0)
    }
}

impl MarketDataPort for MockMarketPort {
    fn fetch_closes(
        &self,
        spec: &MarketSeriesSpec,
        lookback: Lookback,
        _as_of: NaiveDate,
    ) -> Result<RawSeries, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.requests
            .borrow_mut()
            .push((spec.ticker.clone(), lookback));

        if let Some(err) = self.errors.get(&spec.ticker) {
            return Err(err.clone());
        }
        self.data
            .get(&spec.ticker)
            .cloned()
            .ok_or_else(|| FetchError::Empty {
                series: spec.ticker.clone(),
            })
    }
}
