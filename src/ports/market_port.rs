//! Market price provider port.

use crate::domain::error::FetchError;
use crate::domain::series::{Lookback, MarketSeriesSpec, RawSeries};
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Daily closes for one ticker covering `lookback` up to `as_of`.
    fn fetch_closes(
        &self,
        spec: &MarketSeriesSpec,
        lookback: Lookback,
        as_of: NaiveDate,
    ) -> Result<RawSeries, FetchError>;
}
