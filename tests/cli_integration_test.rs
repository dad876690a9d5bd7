//! CLI integration tests.
//!
//! Tests cover:
//! - Config building (pipeline, benchmarks, catalog overrides)
//! - The validate command against INI files on disk
//! - Offline status/chart runs over a directory of CSV series
//! - Session-level snapshot caching

mod common;

use clap::Parser;
use common::date;
use stagwatch::adapters::file_config_adapter::FileConfigAdapter;
use stagwatch::cli::{self, Cli, Session, SourceArgs};
use stagwatch::domain::error::StagwatchError;
use stagwatch::domain::fallback::BenchmarkSet;
use stagwatch::domain::reading::Percent;
use stagwatch::domain::signal::Tier;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[fred]
api_key = test-key
timeout_secs = 10

[series]
equity_index = ^SPX

[cache]
ttl_secs = 600

[signals]
real_rate_tier = yellow
action_threshold = 2

[benchmarks]
as_of = 2025-09-30
core_cpi = 3.1
real_gdp = 1.8
unemployment = 4.3
fed_funds = 4.1
ten_year = 4.15
equity_ytd = 13.7
commodity_change = 3.0
"#;

/// CSV series for a calm economy as of 2025-08-29.
fn write_offline_data(dir: &Path) {
    let monthly = |name: &str, rows: &[(&str, f64)]| {
        let mut body = String::from("date,value\n");
        for (d, v) in rows {
            body.push_str(&format!("{d},{v}\n"));
        }
        fs::write(dir.join(format!("{name}.csv")), body).unwrap();
    };

    monthly("CPILFESL", &[("2025-05-01", 3.2), ("2025-06-01", 3.1), ("2025-07-01", 3.1)]);
    monthly("GDPC1", &[("2025-01-01", -0.5), ("2025-04-01", 3.0)]);
    monthly("UNRATE", &[("2025-06-01", 4.1), ("2025-07-01", 4.2)]);
    monthly("FEDFUNDS", &[("2025-06-01", 5.33), ("2025-07-01", 5.33)]);
    monthly(
        "TNX",
        &[
            ("2024-02-01", 4.15),
            ("2024-08-01", 3.9),
            ("2025-02-03", 4.5),
            ("2025-08-29", 4.23),
        ],
    );
    monthly(
        "GSPC",
        &[("2024-12-31", 5881.63), ("2025-01-02", 5000.0), ("2025-08-29", 5500.0)],
    );
    monthly("CRB", &[("2024-08-01", 200.0), ("2025-08-29", 204.0)]);
}

fn offline_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_offline_data(dir.path());
    dir
}

fn offline_source(dir: &Path) -> SourceArgs {
    SourceArgs {
        config: None,
        offline: Some(dir.to_path_buf()),
        as_of: Some(date(2025, 8, 29)),
    }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("stagwatch").chain(args.iter().copied())).unwrap()
}

mod config_building {
    use super::*;

    #[test]
    fn pipeline_config_from_full_ini() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_pipeline_config(&adapter).unwrap();

        assert_eq!(config.action_threshold, 2);
        assert_eq!(config.catalog.equity_index.ticker, "^SPX");
        assert_eq!(config.catalog.ten_year.ticker, "^TNX");
        assert_eq!(config.rules.rules()[4].tier_on_true, Tier::Yellow);
        assert_eq!(config.benchmarks.id, "benchmarks-2025-09-30");
        assert_eq!(
            config.benchmarks.macro_values.real_gdp_qoq_saar,
            Percent::new(1.8)
        );
        assert_eq!(
            config.benchmarks.market_values.equity_ytd,
            Percent::new(13.7)
        );
    }

    #[test]
    fn defaults_when_sections_absent() {
        let adapter = FileConfigAdapter::from_string("").unwrap();
        let config = cli::build_pipeline_config(&adapter).unwrap();

        assert_eq!(config.action_threshold, 3);
        assert_eq!(config.rules.rules()[4].tier_on_true, Tier::Red);
        assert_eq!(config.benchmarks, BenchmarkSet::builtin());
        assert_eq!(config.catalog.core_cpi.id, "CPILFESL");
    }

    #[test]
    fn partial_benchmarks_are_rejected() {
        let adapter =
            FileConfigAdapter::from_string("[benchmarks]\nas_of = 2025-09-30\ncore_cpi = 3\n")
                .unwrap();
        let err = cli::build_benchmarks(&adapter).unwrap_err();
        assert!(matches!(err, StagwatchError::ConfigMissing { key, .. } if key == "real_gdp"));
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let result = cli::load_config(Some(Path::new("/nonexistent/stagwatch.ini")));
        assert!(matches!(result, Err(StagwatchError::ConfigParse { .. })));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_file_passes() {
        let file = write_temp_ini(VALID_INI);
        let path = file.path().to_string_lossy().to_string();
        assert!(cli::execute(parse(&["validate", "-c", &path])).is_ok());
    }

    #[test]
    fn invalid_tier_fails_with_config_error() {
        let file = write_temp_ini("[signals]\nreal_rate_tier = purple\n");
        let path = file.path().to_string_lossy().to_string();
        let err = cli::execute(parse(&["validate", "-c", &path])).unwrap_err();
        assert!(matches!(err, StagwatchError::ConfigInvalid { .. }));
        let code = std::process::ExitCode::from(&err);
        assert_eq!(format!("{code:?}"), format!("{:?}", std::process::ExitCode::from(2)));
    }
}

mod offline_runs {
    use super::*;

    #[test]
    fn status_writes_live_dashboard() {
        let dir = offline_dir();
        let out = dir.path().join("dashboard.txt");
        let data = dir.path().to_string_lossy().to_string();
        let out_arg = out.to_string_lossy().to_string();

        cli::execute(parse(&[
            "status",
            "--offline",
            &data,
            "--as-of",
            "2025-08-29",
            "-o",
            &out_arg,
        ]))
        .unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Stagflation Monitor (2025-08-29)"));
        assert!(text.contains("0 of 5 signals flashing red"));
        assert!(!text.contains("data unavailable"));
        assert!(!text.contains("benchmark"));
    }

    #[test]
    fn status_with_missing_market_file_falls_back() {
        let dir = offline_dir();
        fs::remove_file(dir.path().join("CRB.csv")).unwrap();
        let out = dir.path().join("dashboard.txt");
        let data = dir.path().to_string_lossy().to_string();
        let out_arg = out.to_string_lossy().to_string();

        cli::execute(parse(&[
            "status",
            "--offline",
            &data,
            "--as-of",
            "2025-08-29",
            "-o",
            &out_arg,
        ]))
        .unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("! market data unavailable"));
        assert!(text.contains("benchmarks-2025-06-30"));
        let cpi = text.lines().find(|l| l.contains("Core CPI YoY")).unwrap();
        assert!(cpi.ends_with("live"));
    }

    #[test]
    fn chart_writes_svg() {
        let dir = offline_dir();
        let out: PathBuf = dir.path().join("yield.svg");
        let data = dir.path().to_string_lossy().to_string();
        let out_arg = out.to_string_lossy().to_string();

        cli::execute(parse(&[
            "chart",
            "--offline",
            &data,
            "--as-of",
            "2025-08-29",
            "-o",
            &out_arg,
        ]))
        .unwrap();

        let svg = fs::read_to_string(&out).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("2025-08-29"));
    }

    #[test]
    fn chart_without_live_market_data_is_report_error() {
        let dir = offline_dir();
        fs::remove_file(dir.path().join("TNX.csv")).unwrap();
        let data = dir.path().to_string_lossy().to_string();
        let out_arg = dir.path().join("yield.svg").to_string_lossy().to_string();

        let err = cli::execute(parse(&[
            "chart",
            "--offline",
            &data,
            "--as-of",
            "2025-08-29",
            "-o",
            &out_arg,
        ]))
        .unwrap_err();
        assert!(matches!(err, StagwatchError::Report { .. }));
    }

    #[test]
    fn watch_stops_after_requested_iterations() {
        let dir = offline_dir();
        let data = dir.path().to_string_lossy().to_string();
        let result = cli::execute(parse(&[
            "watch",
            "--offline",
            &data,
            "--as-of",
            "2025-08-29",
            "--interval-secs",
            "0",
            "--iterations",
            "2",
        ]));
        assert!(result.is_ok());
    }
}

mod session {
    use super::*;

    #[test]
    fn snapshot_is_cached_within_ttl() {
        let dir = offline_dir();
        let session = Session::open(&offline_source(dir.path())).unwrap();

        let first = session.snapshot();
        // Data changes on disk are invisible until the TTL lapses.
        fs::remove_file(dir.path().join("CRB.csv")).unwrap();
        let second = session.snapshot();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.notices.is_empty());
    }

    #[test]
    fn invalidated_cache_sees_new_data() {
        let dir = offline_dir();
        let session = Session::open(&offline_source(dir.path())).unwrap();

        let first = session.snapshot();
        fs::remove_file(dir.path().join("CRB.csv")).unwrap();
        session.cache.invalidate();
        let second = session.snapshot();

        assert!(first.notices.is_empty());
        assert_eq!(second.notices.len(), 1);
    }
}
