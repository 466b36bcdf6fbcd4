//! Application configuration loaded from environment variables.

use std::str::FromStr;

use domain::LifecyclePolicy;
use projections::BusConfig;

use crate::error::{AppError, Result};

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Application configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `EVENT_BUS_CAPACITY`: events buffered per subscriber (default: `1024`)
/// - `PROJECTION_FAILURE_HISTORY`: failures kept per subscription (default: `32`)
/// - `PLAN_LIFECYCLE_POLICY`: `lenient` or `strict` (default: `lenient`)
/// - `PRINT_METRICS`: print a metrics snapshot on exit (default: `false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub bus: BusConfig,
    pub lifecycle_policy: LifecyclePolicy,
    pub print_metrics: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: parse(&lookup, "LOG_FORMAT", defaults.log_format)?,
            bus: BusConfig {
                capacity: parse(&lookup, "EVENT_BUS_CAPACITY", defaults.bus.capacity)?,
                failure_history: parse(
                    &lookup,
                    "PROJECTION_FAILURE_HISTORY",
                    defaults.bus.failure_history,
                )?,
            },
            lifecycle_policy: parse(&lookup, "PLAN_LIFECYCLE_POLICY", defaults.lifecycle_policy)?,
            print_metrics: parse(&lookup, "PRINT_METRICS", defaults.print_metrics)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            bus: BusConfig::default(),
            lifecycle_policy: LifecyclePolicy::default(),
            print_metrics: false,
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| AppError::Config {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bus.capacity, 1024);
        assert_eq!(config.bus.failure_history, 32);
        assert_eq!(config.lifecycle_policy, LifecyclePolicy::Lenient);
        assert!(!config.print_metrics);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("RUST_LOG", "debug,projections=trace"),
            ("LOG_FORMAT", "JSON"),
            ("EVENT_BUS_CAPACITY", "16"),
            ("PROJECTION_FAILURE_HISTORY", "4"),
            ("PLAN_LIFECYCLE_POLICY", "strict"),
            ("PRINT_METRICS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.log_level, "debug,projections=trace");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.bus,
            BusConfig {
                capacity: 16,
                failure_history: 4,
            }
        );
        assert_eq!(config.lifecycle_policy, LifecyclePolicy::Strict);
        assert!(config.print_metrics);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let err = Config::from_lookup(lookup(&[("EVENT_BUS_CAPACITY", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config {
                key: "EVENT_BUS_CAPACITY",
                ..
            }
        ));

        let err = Config::from_lookup(lookup(&[("PLAN_LIFECYCLE_POLICY", "chaotic")])).unwrap_err();
        assert!(err.to_string().contains("PLAN_LIFECYCLE_POLICY"));
    }
}
