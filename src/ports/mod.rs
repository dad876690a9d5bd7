//! Port traits (hexagonal architecture boundaries).

pub mod config_port;
pub mod macro_port;
pub mod market_port;
pub mod report_port;
