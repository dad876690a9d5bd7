//! Core domain types and logic.

pub mod cache;
pub mod config_validation;
pub mod derive;
pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod playbook;
pub mod reading;
pub mod series;
pub mod signal;
