//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvSeriesAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fred_adapter::{self, FredSettings};
use crate::adapters::report::{SvgTrendChart, TextReport};
use crate::adapters::yahoo_adapter::{self, YahooSettings};
use crate::domain::cache::{SnapshotCache, DEFAULT_TTL};
use crate::domain::config_validation::{
    float_setting, int_setting, parse_date, parse_tier, validate_dashboard_config,
};
use crate::domain::error::StagwatchError;
use crate::domain::fallback::BenchmarkSet;
use crate::domain::pipeline::{Dashboard, PipelineConfig, SeriesCatalog, Snapshot};
use crate::domain::playbook::DEFAULT_ACTION_THRESHOLD;
use crate::domain::reading::{MacroValues, MarketValues, Percent};
use crate::domain::signal::{RuleSet, Tier};
use crate::ports::config_port::ConfigPort;
use crate::ports::macro_port::MacroDataPort;
use crate::ports::market_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "stagwatch",
    version,
    about = "Stagflation early-warning dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the data comes from and which day to evaluate.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Read `<id>.csv` series files from DIR instead of the network
    #[arg(long, value_name = "DIR")]
    pub offline: Option<PathBuf>,
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Refresh once and print the dashboard
    Status {
        #[command(flatten)]
        source: SourceArgs,
        /// Also write the dashboard to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the dashboard repeatedly, refreshing when the cache expires
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,
        /// Stop after this many prints
        #[arg(long)]
        iterations: Option<u32>,
    },
    /// Write the 10-year yield trend as SVG
    Chart {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn parse_as_of(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date {value:?}, expected YYYY-MM-DD"))
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), StagwatchError> {
    match cli.command {
        Command::Status { source, output } => run_status(&source, output.as_deref()),
        Command::Watch {
            source,
            interval_secs,
            iterations,
        } => run_watch(&source, Duration::from_secs(interval_secs), iterations),
        Command::Chart { source, output } => run_chart(&source, &output),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Load the INI file when given, otherwise environment variables only.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, StagwatchError> {
    match path {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| StagwatchError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::from_env_only()),
    }
}

fn positive_secs(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Duration,
) -> Result<Duration, StagwatchError> {
    match int_setting(config, section, key)? {
        None => Ok(default),
        Some(secs) if secs > 0 => Ok(Duration::from_secs(secs.unsigned_abs())),
        Some(_) => Err(StagwatchError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        }),
    }
}

pub fn build_fred_settings(config: &dyn ConfigPort) -> Result<FredSettings, StagwatchError> {
    Ok(FredSettings {
        api_key: config.get_string("fred", "api_key").unwrap_or_default(),
        base_url: config
            .get_string("fred", "base_url")
            .unwrap_or_else(|| fred_adapter::DEFAULT_BASE_URL.to_string()),
        timeout: positive_secs(config, "fred", "timeout_secs", fred_adapter::DEFAULT_TIMEOUT)?,
    })
}

pub fn build_yahoo_settings(config: &dyn ConfigPort) -> Result<YahooSettings, StagwatchError> {
    Ok(YahooSettings {
        base_url: config
            .get_string("yahoo", "base_url")
            .unwrap_or_else(|| yahoo_adapter::DEFAULT_BASE_URL.to_string()),
        timeout: positive_secs(config, "yahoo", "timeout_secs", yahoo_adapter::DEFAULT_TIMEOUT)?,
        user_agent: config
            .get_string("yahoo", "user_agent")
            .unwrap_or_else(|| yahoo_adapter::DEFAULT_USER_AGENT.to_string()),
    })
}

pub fn build_cache_ttl(config: &dyn ConfigPort) -> Result<Duration, StagwatchError> {
    positive_secs(config, "cache", "ttl_secs", DEFAULT_TTL)
}

/// Default catalog with any `[series]` overrides applied.
pub fn build_catalog(config: &dyn ConfigPort) -> SeriesCatalog {
    let mut catalog = SeriesCatalog::default();
    let id = |key: &str| config.get_string("series", key).map(|v| v.trim().to_string());

    if let Some(v) = id("core_cpi") {
        catalog.core_cpi.id = v;
    }
    if let Some(v) = id("real_gdp") {
        catalog.real_gdp.id = v;
    }
    if let Some(v) = id("unemployment") {
        catalog.unemployment.id = v;
    }
    if let Some(v) = id("fed_funds") {
        catalog.fed_funds.id = v;
    }
    if let Some(v) = id("ten_year") {
        catalog.ten_year.ticker = v;
    }
    if let Some(v) = id("equity_index") {
        catalog.equity_index.ticker = v;
    }
    if let Some(v) = id("commodity_index") {
        catalog.commodity_index.ticker = v;
    }
    catalog
}

/// `[benchmarks]` when present, otherwise the built-in set.
pub fn build_benchmarks(config: &dyn ConfigPort) -> Result<BenchmarkSet, StagwatchError> {
    let Some(as_of) = config.get_string("benchmarks", "as_of") else {
        return Ok(BenchmarkSet::builtin());
    };
    let as_of = parse_date("benchmarks", "as_of", &as_of)?;

    let value = |key: &str| -> Result<Percent, StagwatchError> {
        float_setting(config, "benchmarks", key)?
            .map(Percent::new)
            .ok_or_else(|| StagwatchError::ConfigMissing {
                section: "benchmarks".to_string(),
                key: key.to_string(),
            })
    };

    Ok(BenchmarkSet::new(
        as_of,
        MacroValues {
            core_cpi_yoy: value("core_cpi")?,
            real_gdp_qoq_saar: value("real_gdp")?,
            unemployment_rate: value("unemployment")?,
            fed_funds: value("fed_funds")?,
        },
        MarketValues {
            ten_year_yield: value("ten_year")?,
            equity_ytd: value("equity_ytd")?,
            commodity_change: value("commodity_change")?,
        },
    ))
}

pub fn build_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, StagwatchError> {
    let real_rate_tier = match config.get_string("signals", "real_rate_tier") {
        None => Tier::Red,
        Some(raw) => parse_tier(&raw).ok_or_else(|| StagwatchError::ConfigInvalid {
            section: "signals".to_string(),
            key: "real_rate_tier".to_string(),
            reason: format!("real_rate_tier must be red or yellow, got {raw:?}"),
        })?,
    };

    let action_threshold = match int_setting(config, "signals", "action_threshold")? {
        None => DEFAULT_ACTION_THRESHOLD,
        Some(n) => usize::try_from(n)
            .ok()
            .filter(|n| (1..=5).contains(n))
            .ok_or_else(|| StagwatchError::ConfigInvalid {
                section: "signals".to_string(),
                key: "action_threshold".to_string(),
                reason: "action_threshold must be between 1 and 5".to_string(),
            })?,
    };

    Ok(PipelineConfig {
        catalog: build_catalog(config),
        rules: RuleSet::standard(real_rate_tier),
        benchmarks: build_benchmarks(config)?,
        action_threshold,
    })
}

/// The two data ports a dashboard reads from.
pub struct DataPorts {
    pub macro_port: Box<dyn MacroDataPort>,
    pub market_port: Box<dyn MarketDataPort>,
}

pub fn build_ports(
    config: &dyn ConfigPort,
    offline: Option<&Path>,
) -> Result<DataPorts, StagwatchError> {
    if let Some(dir) = offline {
        tracing::info!(dir = %dir.display(), "reading series from CSV files");
        return Ok(DataPorts {
            macro_port: Box::new(CsvSeriesAdapter::new(dir.to_path_buf())),
            market_port: Box::new(CsvSeriesAdapter::new(dir.to_path_buf())),
        });
    }
    build_http_ports(config)
}

#[cfg(feature = "http")]
fn build_http_ports(config: &dyn ConfigPort) -> Result<DataPorts, StagwatchError> {
    use crate::adapters::fred_adapter::FredAdapter;
    use crate::adapters::yahoo_adapter::YahooAdapter;

    Ok(DataPorts {
        macro_port: Box::new(FredAdapter::new(build_fred_settings(config)?)?),
        market_port: Box::new(YahooAdapter::new(build_yahoo_settings(config)?)?),
    })
}

#[cfg(not(feature = "http"))]
fn build_http_ports(_config: &dyn ConfigPort) -> Result<DataPorts, StagwatchError> {
    Err(StagwatchError::Provider {
        reason: "built without the `http` feature; pass --offline DIR".into(),
    })
}

/// Everything one command needs to produce snapshots.
pub struct Session {
    pub ports: DataPorts,
    pub pipeline: PipelineConfig,
    pub cache: SnapshotCache,
    pub as_of: Option<NaiveDate>,
}

impl Session {
    pub fn open(source: &SourceArgs) -> Result<Self, StagwatchError> {
        let config = load_config(source.config.as_deref())?;
        validate_dashboard_config(&config)?;

        let pipeline = build_pipeline_config(&config)?;
        let cache = SnapshotCache::new(build_cache_ttl(&config)?);
        let ports = build_ports(&config, source.offline.as_deref())?;

        tracing::debug!(
            benchmarks = %pipeline.benchmarks.id,
            ttl_secs = cache.ttl().as_secs(),
            action_threshold = pipeline.action_threshold,
            "session configured"
        );

        Ok(Self {
            ports,
            pipeline,
            cache,
            as_of: source.as_of,
        })
    }

    /// The cached snapshot, refreshed when the TTL has lapsed.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        self.cache.get_or_refresh(|| {
            Dashboard::new(
                self.ports.macro_port.as_ref(),
                self.ports.market_port.as_ref(),
                &self.pipeline,
            )
            .refresh(as_of)
        })
    }
}

fn run_status(source: &SourceArgs, output: Option<&Path>) -> Result<(), StagwatchError> {
    let session = Session::open(source)?;
    let snapshot = session.snapshot();

    let report = TextReport::new();
    print!("{}", report.render(&snapshot)?);

    if let Some(path) = output {
        report.write(&snapshot, &path.to_string_lossy())?;
        eprintln!("Dashboard written to {}", path.display());
    }
    Ok(())
}

fn run_watch(
    source: &SourceArgs,
    interval: Duration,
    iterations: Option<u32>,
) -> Result<(), StagwatchError> {
    let session = Session::open(source)?;
    let report = TextReport::new();
    let mut printed = 0u32;

    loop {
        let snapshot = session.snapshot();
        println!("{}", report.render(&snapshot)?);
        printed += 1;

        if iterations.is_some_and(|n| printed >= n) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn run_chart(source: &SourceArgs, output: &Path) -> Result<(), StagwatchError> {
    let session = Session::open(source)?;
    let snapshot = session.snapshot();

    SvgTrendChart::new().write(&snapshot, &output.to_string_lossy())?;
    eprintln!("Chart written to {}", output.display());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), StagwatchError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(Some(config_path))?;
    validate_dashboard_config(&config)?;

    let pipeline = build_pipeline_config(&config)?;
    let catalog = &pipeline.catalog;
    eprintln!(
        "  macro series:  {}, {}, {}, {}",
        catalog.core_cpi.id, catalog.real_gdp.id, catalog.unemployment.id, catalog.fed_funds.id
    );
    eprintln!(
        "  market series: {}, {}, {}",
        catalog.ten_year.ticker, catalog.equity_index.ticker, catalog.commodity_index.ticker
    );
    eprintln!("  benchmarks:    {}", pipeline.benchmarks.id);
    eprintln!("  action at:     {} red signals", pipeline.action_threshold);

    if config
        .get_string("fred", "api_key")
        .is_none_or(|k| k.trim().is_empty())
    {
        eprintln!("  warning: no FRED API key; macro readings will use benchmarks");
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
