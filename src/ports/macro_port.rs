//! Macro statistics provider port.

use crate::domain::error::FetchError;
use crate::domain::series::{MacroSeriesSpec, RawSeries};
use chrono::NaiveDate;

pub trait MacroDataPort {
    /// Fetch one series, optionally starting at `observation_start`.
    ///
    /// Implementations make exactly one attempt and return observations
    /// sorted ascending by date.
    fn fetch_series(
        &self,
        spec: &MacroSeriesSpec,
        observation_start: Option<NaiveDate>,
    ) -> Result<RawSeries, FetchError>;
}
