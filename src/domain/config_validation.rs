//! Configuration validation.
//!
//! Runs before any provider is contacted so a bad file fails with a
//! config exit code instead of surfacing as a fallback.

use crate::domain::error::StagwatchError;
use crate::domain::signal::Tier;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SERIES_KEYS: [&str; 7] = [
    "core_cpi",
    "real_gdp",
    "unemployment",
    "fed_funds",
    "ten_year",
    "equity_index",
    "commodity_index",
];

pub const BENCHMARK_VALUE_KEYS: [&str; 7] = [
    "core_cpi",
    "real_gdp",
    "unemployment",
    "fed_funds",
    "ten_year",
    "equity_ytd",
    "commodity_change",
];

pub fn validate_dashboard_config(config: &dyn ConfigPort) -> Result<(), StagwatchError> {
    validate_timeout(config, "fred")?;
    validate_timeout(config, "yahoo")?;
    validate_series(config)?;
    validate_cache_ttl(config)?;
    validate_real_rate_tier(config)?;
    validate_action_threshold(config)?;
    validate_benchmarks(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StagwatchError {
    StagwatchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Integer setting, `None` when absent. Non-numeric text is an error
/// rather than a silent default.
pub fn int_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, StagwatchError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("{key} must be an integer, got {raw:?}"))),
    }
}

/// Float setting, `None` when absent.
pub fn float_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, StagwatchError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, format!("{key} must be a number, got {raw:?}"))),
        },
    }
}

pub fn parse_tier(value: &str) -> Option<Tier> {
    match value.trim().to_ascii_lowercase().as_str() {
        "red" => Some(Tier::Red),
        "yellow" => Some(Tier::Yellow),
        _ => None,
    }
}

pub fn parse_date(section: &str, key: &str, value: &str) -> Result<NaiveDate, StagwatchError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(section, key, format!("invalid {key} format, expected YYYY-MM-DD")))
}

fn validate_timeout(config: &dyn ConfigPort, section: &str) -> Result<(), StagwatchError> {
    if let Some(secs) = int_setting(config, section, "timeout_secs")? {
        if secs <= 0 {
            return Err(invalid(section, "timeout_secs", "timeout_secs must be positive"));
        }
    }
    Ok(())
}

fn validate_series(config: &dyn ConfigPort) -> Result<(), StagwatchError> {
    for key in SERIES_KEYS {
        if let Some(id) = config.get_string("series", key) {
            if id.contains(|c: char| c.is_whitespace() || c == '/') {
                return Err(invalid(
                    "series",
                    key,
                    format!("{key} must be a bare series id, got {id:?}"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_cache_ttl(config: &dyn ConfigPort) -> Result<(), StagwatchError> {
    if let Some(ttl) = int_setting(config, "cache", "ttl_secs")? {
        if ttl <= 0 {
            return Err(invalid("cache", "ttl_secs", "ttl_secs must be positive"));
        }
    }
    Ok(())
}

fn validate_real_rate_tier(config: &dyn ConfigPort) -> Result<(), StagwatchError> {
    match config.get_string("signals", "real_rate_tier") {
        Some(raw) if parse_tier(&raw).is_none() => Err(invalid(
            "signals",
            "real_rate_tier",
            format!("real_rate_tier must be red or yellow, got {raw:?}"),
        )),
        _ => Ok(()),
    }
}

fn validate_action_threshold(config: &dyn ConfigPort) -> Result<(), StagwatchError> {
    if let Some(n) = int_setting(config, "signals", "action_threshold")? {
        if !(1..=5).contains(&n) {
            return Err(invalid(
                "signals",
                "action_threshold",
                "action_threshold must be between 1 and 5",
            ));
        }
    }
    Ok(())
}

/// A `[benchmarks]` section replaces the built-in set wholesale, so a
/// partial override is rejected.
fn validate_benchmarks(config: &dyn ConfigPort) -> Result<(), StagwatchError> {
    let as_of = config.get_string("benchmarks", "as_of");
    let any_value = BENCHMARK_VALUE_KEYS
        .iter()
        .any(|key| config.get_string("benchmarks", key).is_some());

    if as_of.is_none() && !any_value {
        return Ok(());
    }

    match as_of {
        None => {
            return Err(StagwatchError::ConfigMissing {
                section: "benchmarks".to_string(),
                key: "as_of".to_string(),
            })
        }
        Some(raw) => {
            parse_date("benchmarks", "as_of", &raw)?;
        }
    }

    for key in BENCHMARK_VALUE_KEYS {
        if float_setting(config, "benchmarks", key)?.is_none() {
            return Err(StagwatchError::ConfigMissing {
                section: "benchmarks".to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}
