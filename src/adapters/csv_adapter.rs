//! CSV directory adapter serving both data ports offline.
//!
//! Each series lives in `<id>.csv` with a `date,value` header. Values are
//! stored already transformed (a CPI file holds year-over-year percent,
//! not index levels). A leading `^` is dropped from tickers so `^GSPC`
//! reads `GSPC.csv`.

use crate::domain::error::{FetchError, ParseError};
use crate::domain::series::{
    coerce_value, Lookback, MacroSeriesSpec, MarketSeriesSpec, Observation, RawSeries, SeriesUnit,
};
use crate::ports::macro_port::MacroDataPort;
use crate::ports::market_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, id: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.csv", id.trim_start_matches('^')))
    }

    fn read_series(
        &self,
        id: &str,
        unit: SeriesUnit,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RawSeries, FetchError> {
        let path = self.csv_path(id);
        let content = fs::read_to_string(&path).map_err(|e| FetchError::Network {
            series: id.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let parse_error = |reason: String| ParseError {
            series: id.to_string(),
            reason,
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut observations = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| parse_error(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| parse_error("missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| parse_error(format!("invalid date {:?}: {}", date_str, e)))?;

            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            observations.push(Observation {
                date,
                value: record.get(1).and_then(coerce_value),
            });
        }

        if observations.is_empty() {
            return Err(FetchError::Empty {
                series: id.to_string(),
            });
        }

        tracing::debug!(series = id, rows = observations.len(), path = %path.display(), "CSV series loaded");
        Ok(RawSeries::new(id, unit, observations))
    }
}

impl MacroDataPort for CsvSeriesAdapter {
    fn fetch_series(
        &self,
        spec: &MacroSeriesSpec,
        observation_start: Option<NaiveDate>,
    ) -> Result<RawSeries, FetchError> {
        self.read_series(&spec.id, spec.unit, observation_start, None)
    }
}

impl MarketDataPort for CsvSeriesAdapter {
    fn fetch_closes(
        &self,
        spec: &MarketSeriesSpec,
        lookback: Lookback,
        as_of: NaiveDate,
    ) -> Result<RawSeries, FetchError> {
        self.read_series(
            &spec.ticker,
            spec.unit,
            Some(lookback.start_date(as_of)),
            Some(as_of),
        )
    }
}
