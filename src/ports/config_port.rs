//! Configuration access port trait.
//!
//! Values come back as raw text; typed parsing and its errors live in
//! `domain::config_validation` so a malformed number is reported, not
//! silently defaulted.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
