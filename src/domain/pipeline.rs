//! One refresh cycle: fetch, derive, fall back, evaluate.
//!
//! Stages:
//! 1. Macro group (four series from the macro port)
//! 2. Market group (three tickers from the market port)
//! 3. ReadingSet assembly from both group outcomes
//! 4. Signal evaluation and playbook advice
//! 5. Supplementary display metrics from the live trend series

use crate::domain::derive::{
    latest_rate, months_back, sustained_above, trailing_change, year_to_date_return,
    COMMODITY_WINDOW_MONTHS, SUSTAINED_WINDOW_MONTHS, YIELD_RISE_WINDOW_MONTHS,
};
use crate::domain::error::PipelineError;
use crate::domain::fallback::{resolve_group, BenchmarkSet, FallbackNotice, Group};
use crate::domain::playbook::{self, Advice, DEFAULT_ACTION_THRESHOLD};
use crate::domain::reading::{MacroValues, MarketValues, Percent, ReadingSet};
use crate::domain::series::{
    Lookback, MacroSeriesSpec, MarketSeriesSpec, RawSeries, SeriesUnit, Transform,
};
use crate::domain::signal::{self, RuleSet, VerdictSet, CPI_HIGH};
use crate::ports::macro_port::MacroDataPort;
use crate::ports::market_port::MarketDataPort;
use chrono::NaiveDate;

/// Months of macro history requested per series.
pub const MACRO_HISTORY_MONTHS: u32 = 24;
/// Window of the 10-year yield trend chart.
pub const YIELD_TREND_MONTHS: u32 = 24;
/// History requested for the commodity index; covers the 18-month window.
pub const COMMODITY_HISTORY_MONTHS: u32 = 19;

/// Which provider series feed each reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCatalog {
    pub core_cpi: MacroSeriesSpec,
    pub real_gdp: MacroSeriesSpec,
    pub unemployment: MacroSeriesSpec,
    pub fed_funds: MacroSeriesSpec,
    pub ten_year: MarketSeriesSpec,
    pub equity_index: MarketSeriesSpec,
    pub commodity_index: MarketSeriesSpec,
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self {
            core_cpi: MacroSeriesSpec::new("CPILFESL", Transform::YearAgoChange, SeriesUnit::Percent),
            real_gdp: MacroSeriesSpec::new("GDPC1", Transform::AnnualizedChange, SeriesUnit::Percent),
            unemployment: MacroSeriesSpec::new("UNRATE", Transform::Levels, SeriesUnit::Percent),
            fed_funds: MacroSeriesSpec::new("FEDFUNDS", Transform::Levels, SeriesUnit::Percent),
            ten_year: MarketSeriesSpec::new("^TNX", SeriesUnit::Percent),
            equity_index: MarketSeriesSpec::new("^GSPC", SeriesUnit::Level),
            commodity_index: MarketSeriesSpec::new("^CRB", SeriesUnit::Level),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub catalog: SeriesCatalog,
    pub rules: RuleSet,
    pub benchmarks: BenchmarkSet,
    pub action_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: SeriesCatalog::default(),
            rules: RuleSet::default(),
            benchmarks: BenchmarkSet::builtin(),
            action_threshold: DEFAULT_ACTION_THRESHOLD,
        }
    }
}

/// Series tails handed to the chart renderers. Empty when the owning
/// group fell back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trends {
    pub ten_year_yield: Vec<(NaiveDate, f64)>,
}

/// Display-only metrics; `None` when the live series could not support them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Supplementary {
    pub yield_change_18m: Option<Percent>,
    pub cpi_sustained_above_high: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub as_of: NaiveDate,
    pub readings: ReadingSet,
    pub verdicts: VerdictSet,
    pub advice: Advice,
    pub notices: Vec<FallbackNotice>,
    pub trends: Trends,
    pub supplementary: Supplementary,
    pub benchmark_id: String,
}

impl Snapshot {
    pub fn headline(&self) -> String {
        playbook::headline(&self.verdicts)
    }
}

struct MacroAux {
    core_cpi: RawSeries,
}

struct MarketAux {
    ten_year: RawSeries,
}

/// Composes the ports with the pipeline configuration.
pub struct Dashboard<'a> {
    macro_port: &'a dyn MacroDataPort,
    market_port: &'a dyn MarketDataPort,
    config: &'a PipelineConfig,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        macro_port: &'a dyn MacroDataPort,
        market_port: &'a dyn MarketDataPort,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            macro_port,
            market_port,
            config,
        }
    }

    pub fn refresh(&self, as_of: NaiveDate) -> Snapshot {
        tracing::info!(%as_of, "refreshing dashboard");
        let benchmarks = &self.config.benchmarks;

        let macro_outcome = resolve_group(
            Group::Macro,
            benchmarks.macro_values,
            benchmarks,
            as_of,
            || self.fetch_macro(as_of),
        );
        let market_outcome = resolve_group(
            Group::Market,
            benchmarks.market_values,
            benchmarks,
            as_of,
            || self.fetch_market(as_of),
        );

        let readings = ReadingSet::from_groups(
            macro_outcome.values,
            macro_outcome.provenance,
            market_outcome.values,
            market_outcome.provenance,
        );
        let verdicts = signal::evaluate(&self.config.rules, &readings);
        let advice = playbook::advise(&verdicts, self.config.action_threshold);

        let trend_start = months_back(as_of, YIELD_TREND_MONTHS);
        let mut trends = Trends::default();
        let mut supplementary = Supplementary::default();

        if let Some(aux) = &macro_outcome.aux {
            supplementary.cpi_sustained_above_high =
                sustained_above(&aux.core_cpi, CPI_HIGH, SUSTAINED_WINDOW_MONTHS)
                    .map_err(|e| tracing::debug!(error = %e, "sustained CPI check skipped"))
                    .ok();
        }
        if let Some(aux) = &market_outcome.aux {
            trends.ten_year_yield = aux.ten_year.tail_since(trend_start);
            supplementary.yield_change_18m =
                trailing_change(&aux.ten_year, YIELD_RISE_WINDOW_MONTHS)
                    .map_err(|e| tracing::debug!(error = %e, "18-month yield change skipped"))
                    .ok();
        }

        let notices: Vec<FallbackNotice> = [macro_outcome.notice, market_outcome.notice]
            .into_iter()
            .flatten()
            .collect();

        tracing::info!(
            red_count = verdicts.red_count,
            fallbacks = notices.len(),
            ?advice,
            "dashboard refreshed"
        );

        Snapshot {
            as_of,
            readings,
            verdicts,
            advice,
            notices,
            trends,
            supplementary,
            benchmark_id: benchmarks.id.clone(),
        }
    }

    fn fetch_macro(&self, as_of: NaiveDate) -> Result<(MacroValues, MacroAux), PipelineError> {
        let catalog = &self.config.catalog;
        let start = Some(months_back(as_of, MACRO_HISTORY_MONTHS));

        let core_cpi = self.macro_port.fetch_series(&catalog.core_cpi, start)?;
        let real_gdp = self.macro_port.fetch_series(&catalog.real_gdp, start)?;
        let unemployment = self.macro_port.fetch_series(&catalog.unemployment, start)?;
        let fed_funds = self.macro_port.fetch_series(&catalog.fed_funds, start)?;

        let values = MacroValues {
            core_cpi_yoy: latest_rate(&core_cpi)?,
            real_gdp_qoq_saar: latest_rate(&real_gdp)?,
            unemployment_rate: latest_rate(&unemployment)?,
            fed_funds: latest_rate(&fed_funds)?,
        };
        tracing::debug!(?values, "macro readings derived");
        Ok((values, MacroAux { core_cpi }))
    }

    fn fetch_market(&self, as_of: NaiveDate) -> Result<(MarketValues, MarketAux), PipelineError> {
        let catalog = &self.config.catalog;

        let ten_year = self.market_port.fetch_closes(
            &catalog.ten_year,
            Lookback::Months(YIELD_TREND_MONTHS),
            as_of,
        )?;
        let equity = self
            .market_port
            .fetch_closes(&catalog.equity_index, Lookback::YearToDate, as_of)?;
        let commodity = self.market_port.fetch_closes(
            &catalog.commodity_index,
            Lookback::Months(COMMODITY_HISTORY_MONTHS),
            as_of,
        )?;

        let values = MarketValues {
            ten_year_yield: latest_rate(&ten_year)?,
            equity_ytd: year_to_date_return(&equity, as_of)?,
            commodity_change: trailing_change(&commodity, COMMODITY_WINDOW_MONTHS)?,
        };
        tracing::debug!(?values, "market readings derived");
        Ok((values, MarketAux { ten_year }))
    }
}
