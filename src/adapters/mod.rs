//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod fred_adapter;
#[cfg(feature = "http")]
pub mod http;
pub mod report;
pub mod yahoo_adapter;
