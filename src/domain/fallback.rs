//! Fallback policy: the error boundary of a refresh cycle.
//!
//! Each provider group either yields all of its readings live or is
//! replaced wholesale by a dated benchmark set. Nothing past
//! [`resolve_group`] ever sees a fetch or derivation error.

use crate::domain::error::PipelineError;
use crate::domain::reading::{MacroValues, MarketValues, Percent, Provenance};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Macro,
    Market,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Macro => write!(f, "macro"),
            Group::Market => write!(f, "market"),
        }
    }
}

/// Benchmark constants substituted when a group fails.
///
/// `as_of` is mandatory: a stale set silently misrepresents current
/// conditions, so every notice reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSet {
    pub id: String,
    pub as_of: NaiveDate,
    pub macro_values: MacroValues,
    pub market_values: MarketValues,
}

impl BenchmarkSet {
    pub fn new(as_of: NaiveDate, macro_values: MacroValues, market_values: MarketValues) -> Self {
        Self {
            id: format!("benchmarks-{}", as_of.format("%Y-%m-%d")),
            as_of,
            macro_values,
            market_values,
        }
    }

    /// Built-in set, as of the end of Q2 2025.
    pub fn builtin() -> Self {
        Self::new(
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or(NaiveDate::MIN),
            MacroValues {
                core_cpi_yoy: Percent::new(2.9),
                real_gdp_qoq_saar: Percent::new(3.0),
                unemployment_rate: Percent::new(4.1),
                fed_funds: Percent::new(4.33),
            },
            MarketValues {
                ten_year_yield: Percent::new(4.24),
                equity_ytd: Percent::new(5.5),
                commodity_change: Percent::new(2.0),
            },
        )
    }

    /// Days between the benchmark date and `today`, never negative.
    pub fn age_days(&self, today: NaiveDate) -> i64 {
        (today - self.as_of).num_days().max(0)
    }
}

/// Advisory shown when a group fell back.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackNotice {
    pub group: Group,
    pub reason: String,
    pub benchmark_id: String,
    pub benchmark_age_days: i64,
}

impl fmt::Display for FallbackNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} data unavailable ({}); showing {} ({} days old)",
            self.group, self.reason, self.benchmark_id, self.benchmark_age_days
        )
    }
}

/// Outcome of one group: its values, where they came from, and the
/// group's auxiliary output (trend series etc.) when live.
#[derive(Debug, Clone)]
pub struct GroupOutcome<T, A> {
    pub values: T,
    pub provenance: Provenance,
    pub aux: Option<A>,
    pub notice: Option<FallbackNotice>,
}

/// Run a group and substitute `benchmark` for all of its values on any
/// error.
pub fn resolve_group<T, A, F>(
    group: Group,
    benchmark: T,
    benchmarks: &BenchmarkSet,
    today: NaiveDate,
    run: F,
) -> GroupOutcome<T, A>
where
    F: FnOnce() -> Result<(T, A), PipelineError>,
{
    match run() {
        Ok((values, aux)) => GroupOutcome {
            values,
            provenance: Provenance::Live,
            aux: Some(aux),
            notice: None,
        },
        Err(e) => {
            let notice = FallbackNotice {
                group,
                reason: e.to_string(),
                benchmark_id: benchmarks.id.clone(),
                benchmark_age_days: benchmarks.age_days(today),
            };
            tracing::warn!(
                group = %group,
                error = %e,
                benchmark = %benchmarks.id,
                "provider group failed, using benchmark values"
            );
            GroupOutcome {
                values: benchmark,
                provenance: Provenance::Fallback,
                aux: None,
                notice: Some(notice),
            }
        }
    }
}
