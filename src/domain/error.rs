//! Domain error types.
//!
//! Fetch and derivation failures never leave a refresh cycle: they are
//! folded into [`PipelineError`] and absorbed by the fallback boundary.
//! [`StagwatchError`] covers the outer surfaces (config, reports, I/O).

use chrono::NaiveDate;

/// A provider payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed payload for {series}: {reason}")]
pub struct ParseError {
    pub series: String,
    pub reason: String,
}

/// A single provider request that did not yield a series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("network error fetching {series}: {reason}")]
    Network { series: String, reason: String },

    #[error("timed out fetching {series}")]
    Timeout { series: String },

    #[error("provider returned HTTP {status} for {series}")]
    Status { series: String, status: u16 },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no observations returned for {series}")]
    Empty { series: String },
}

impl FetchError {
    pub fn series(&self) -> &str {
        match self {
            FetchError::Network { series, .. }
            | FetchError::Timeout { series }
            | FetchError::Status { series, .. }
            | FetchError::Empty { series } => series,
            FetchError::Parse(e) => &e.series,
        }
    }
}

/// A windowed computation that the series cannot support.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DerivationError {
    #[error("{series} has no valued observations")]
    EmptySeries { series: String },

    #[error("insufficient data for {series}: have {have} observations, need {need}")]
    InsufficientData {
        series: String,
        have: usize,
        need: usize,
    },

    #[error("{series}: window anchor {anchor} predates earliest observation {earliest}")]
    AnchorOutOfRange {
        series: String,
        anchor: NaiveDate,
        earliest: NaiveDate,
    },

    #[error("{series} is a level series, expected a rate")]
    UnitMismatch { series: String },

    #[error("{series} is not a gap-free monthly series: {reason}")]
    IrregularSeries { series: String, reason: String },
}

/// Anything that can go wrong inside one fallback group.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

/// Top-level error type for the CLI and adapters outside the refresh cycle.
#[derive(Debug, thiserror::Error)]
pub enum StagwatchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error("provider unavailable: {reason}")]
    Provider { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StagwatchError> for std::process::ExitCode {
    fn from(err: &StagwatchError) -> Self {
        let code: u8 = match err {
            StagwatchError::Io(_) => 1,
            StagwatchError::ConfigParse { .. }
            | StagwatchError::ConfigMissing { .. }
            | StagwatchError::ConfigInvalid { .. } => 2,
            StagwatchError::Report { .. } => 3,
            StagwatchError::Provider { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
