//! Yahoo Finance chart API adapter for daily closes.

use crate::domain::error::{FetchError, ParseError};
use crate::domain::series::{MarketSeriesSpec, Observation, RawSeries};
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// The chart endpoint answers non-browser agents with 429.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    // Absent entirely when the range holds no trading days.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Decode a chart payload into a series of daily closes. Timestamps are
/// shifted by the exchange offset so each close lands on its trading day.
pub fn parse_chart(spec: &MarketSeriesSpec, body: &str) -> Result<RawSeries, FetchError> {
    let parse_error = |reason: String| ParseError {
        series: spec.ticker.clone(),
        reason,
    };

    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(parse_error(format!("{}: {}", err.code, err.description)).into());
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FetchError::Empty {
            series: spec.ticker.clone(),
        })?;

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if data.timestamp.is_empty() {
        return Err(FetchError::Empty {
            series: spec.ticker.clone(),
        });
    }
    if closes.len() != data.timestamp.len() {
        return Err(parse_error(format!(
            "{} timestamps but {} closes",
            data.timestamp.len(),
            closes.len()
        ))
        .into());
    }

    let offset = data.meta.gmtoffset;
    let observations = data
        .timestamp
        .iter()
        .zip(closes)
        .map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts + offset, 0)
                .ok_or_else(|| parse_error(format!("timestamp out of range: {ts}")))?
                .date_naive();
            Ok(Observation {
                date,
                value: close.filter(|v| v.is_finite()),
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(RawSeries::new(spec.ticker.clone(), spec.unit, observations))
}

#[cfg(feature = "http")]
pub use client::YahooAdapter;

#[cfg(feature = "http")]
mod client {
    use super::*;
    use crate::adapters::http::{check_status, transport_error};
    use crate::domain::error::StagwatchError;
    use crate::domain::series::Lookback;
    use crate::ports::market_port::MarketDataPort;
    use chrono::{Days, NaiveDate};

    pub struct YahooAdapter {
        client: reqwest::blocking::Client,
        settings: YahooSettings,
    }

    impl YahooAdapter {
        pub fn new(settings: YahooSettings) -> Result<Self, StagwatchError> {
            let client = reqwest::blocking::Client::builder()
                .user_agent(settings.user_agent.as_str())
                .timeout(settings.timeout)
                .build()
                .map_err(|e| StagwatchError::Provider {
                    reason: format!("failed to build Yahoo client: {e}"),
                })?;
            Ok(Self { client, settings })
        }
    }

    fn unix_midnight(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    }

    impl MarketDataPort for YahooAdapter {
        fn fetch_closes(
            &self,
            spec: &MarketSeriesSpec,
            lookback: Lookback,
            as_of: NaiveDate,
        ) -> Result<RawSeries, FetchError> {
            let period1 = unix_midnight(lookback.start_date(as_of));
            // period2 is exclusive; include the as-of session.
            let period2 = unix_midnight(as_of.checked_add_days(Days::new(1)).unwrap_or(as_of));

            let url = format!(
                "{}/{}",
                self.settings.base_url.trim_end_matches('/'),
                spec.ticker
            );
            tracing::debug!(ticker = %spec.ticker, ?lookback, %as_of, "fetching Yahoo closes");

            let response = self
                .client
                .get(&url)
                .query(&[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                ])
                .send()
                .map_err(|e| transport_error(&spec.ticker, e))?;
            let response = check_status(&spec.ticker, response)?;
            let body = response
                .text()
                .map_err(|e| transport_error(&spec.ticker, e))?;

            let series = parse_chart(spec, &body)?;
            // Weekend and holiday requests can return the following session.
            let observations: Vec<Observation> = series
                .observations()
                .iter()
                .copied()
                .filter(|o| o.date <= as_of)
                .collect();
            if observations.is_empty() {
                return Err(FetchError::Empty {
                    series: spec.ticker.clone(),
                });
            }
            tracing::debug!(ticker = %spec.ticker, closes = observations.len(), "Yahoo closes fetched");
            Ok(RawSeries::new(series.id, series.unit, observations))
        }
    }
}
