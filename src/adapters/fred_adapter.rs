//! FRED observations API adapter.
//!
//! Fetches `/series/observations` as JSON. FRED reports missing
//! observations as `"."`, which become gaps rather than zeros.

use crate::domain::error::{FetchError, ParseError};
use crate::domain::series::{coerce_value, MacroSeriesSpec, Observation, RawSeries, Transform};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct FredSettings {
    /// Opaque credential, passed through untouched.
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for FredSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

/// FRED `units` query value for a transform.
pub fn units_param(transform: Transform) -> &'static str {
    match transform {
        Transform::Levels => "lin",
        Transform::YearAgoChange => "pc1",
        Transform::AnnualizedChange => "pca",
    }
}

/// Decode an observations payload into a sorted series.
pub fn parse_observations(spec: &MacroSeriesSpec, body: &str) -> Result<RawSeries, FetchError> {
    let response: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| ParseError {
            series: spec.id.clone(),
            reason: e.to_string(),
        })?;

    if response.observations.is_empty() {
        return Err(FetchError::Empty {
            series: spec.id.clone(),
        });
    }

    let observations = response
        .observations
        .iter()
        .map(|o| {
            let date = NaiveDate::parse_from_str(&o.date, "%Y-%m-%d").map_err(|e| ParseError {
                series: spec.id.clone(),
                reason: format!("invalid date {:?}: {}", o.date, e),
            })?;
            Ok(Observation {
                date,
                value: coerce_value(&o.value),
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(RawSeries::new(spec.id.clone(), spec.unit, observations))
}

#[cfg(feature = "http")]
pub use client::FredAdapter;

#[cfg(feature = "http")]
mod client {
    use super::*;
    use crate::adapters::http::{check_status, transport_error, USER_AGENT};
    use crate::domain::error::StagwatchError;
    use crate::ports::macro_port::MacroDataPort;

    pub struct FredAdapter {
        client: reqwest::blocking::Client,
        settings: FredSettings,
    }

    impl FredAdapter {
        pub fn new(settings: FredSettings) -> Result<Self, StagwatchError> {
            if settings.api_key.trim().is_empty() {
                tracing::warn!("no FRED API key configured; macro readings will fall back");
            }
            let client = reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(settings.timeout)
                .build()
                .map_err(|e| StagwatchError::Provider {
                    reason: format!("failed to build FRED client: {e}"),
                })?;
            Ok(Self { client, settings })
        }

        fn query(
            &self,
            spec: &MacroSeriesSpec,
            observation_start: Option<NaiveDate>,
        ) -> Vec<(&'static str, String)> {
            let mut params = vec![
                ("series_id", spec.id.clone()),
                ("api_key", self.settings.api_key.clone()),
                ("file_type", "json".to_string()),
                ("units", units_param(spec.transform).to_string()),
            ];
            if let Some(start) = observation_start {
                params.push(("observation_start", start.format("%Y-%m-%d").to_string()));
            }
            params
        }
    }

    impl MacroDataPort for FredAdapter {
        fn fetch_series(
            &self,
            spec: &MacroSeriesSpec,
            observation_start: Option<NaiveDate>,
        ) -> Result<RawSeries, FetchError> {
            let url = format!(
                "{}/series/observations",
                self.settings.base_url.trim_end_matches('/')
            );
            tracing::debug!(series = %spec.id, "fetching FRED series");

            let response = self
                .client
                .get(&url)
                .query(&self.query(spec, observation_start))
                .send()
                .map_err(|e| transport_error(&spec.id, e))?;
            let response = check_status(&spec.id, response)?;
            let body = response.text().map_err(|e| transport_error(&spec.id, e))?;

            let series = parse_observations(spec, &body)?;
            tracing::debug!(series = %spec.id, observations = series.len(), "FRED series fetched");
            Ok(series)
        }
    }
}
