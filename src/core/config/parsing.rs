use std::env;
use std::str::FromStr;

use super::types::{ConfigError, Environment};

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn env_flag(key: &'static str) -> bool {
    env_optional(key).is_some_and(|value| parse_bool(&value))
}

/// Reads a numeric variable, falling back to `default` when unset.
pub(super) fn env_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_optional(key) {
        Some(raw) => parse_number(key, raw),
        None => Ok(default),
    }
}

pub(super) fn parse_number<T: FromStr>(field: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue { field, value })
}

/// Comma separated file extensions, lowercased and without leading dots.
pub(super) fn parse_extension_list(value: Option<String>, defaults: &[&str]) -> Vec<String> {
    let Some(raw) = value else {
        return defaults.iter().map(|item| item.to_string()).collect();
    };

    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',') {
        let normalized = item.trim().trim_start_matches('.').to_ascii_lowercase();
        if !normalized.is_empty() && !items.contains(&normalized) {
            items.push(normalized);
        }
    }
    items
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.map(|item| item.to_ascii_lowercase()).as_deref() {
        Some("production" | "prod") => Environment::Production,
        Some("staging") => Environment::Staging,
        Some("test" | "testing") => Environment::Test,
        _ => Environment::Development,
    }
}
