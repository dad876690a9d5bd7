//! Shared blocking-HTTP helpers for the provider adapters.

use crate::domain::error::FetchError;

/// Sent to FRED. Yahoo gets a browser agent, see `yahoo_adapter`.
pub const USER_AGENT: &str = concat!("stagwatch/", env!("CARGO_PKG_VERSION"));

/// reqwest errors carry the request URL, and the FRED query string
/// holds the API key, so the URL is stripped before the reason is kept.
pub fn transport_error(series: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            series: series.to_string(),
        }
    } else {
        FetchError::Network {
            series: series.to_string(),
            reason: e.without_url().to_string(),
        }
    }
}

/// Anything other than 200 is a failed fetch.
pub fn check_status(
    series: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, FetchError> {
    let status = response.status().as_u16();
    if status != 200 {
        tracing::debug!(series, status, "provider returned non-success status");
        return Err(FetchError::Status {
            series: series.to_string(),
            status,
        });
    }
    Ok(response)
}
