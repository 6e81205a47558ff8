// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Header and attribute lists are not parsed here: they are opaque strings
//! until the output builds its pipeline, where a malformed list becomes an
//! exporter or resource creation error.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::OteloutConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &OteloutConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.output.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "output.log_level `{}` must be one of: {}",
                config.output.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(endpoint) = &config.exporter.endpoint {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "exporter.endpoint `{endpoint}` must be an http:// or https:// URL"
                ),
            });
        }
    }

    if config.exporter.timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "exporter.timeout_ms must be greater than zero".to_string(),
        });
    }

    if config.reader.interval_ms == Some(0) {
        errors.push(ConfigError::Validation {
            message: "reader.interval_ms must be greater than zero".to_string(),
        });
    }

    if config.shutdown.timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "shutdown.timeout_ms must be greater than zero".to_string(),
        });
    }

    if config.meter.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "meter.name must not be empty".to_string(),
        });
    }

    let histograms: HashSet<&str> = config.mapping.histograms.iter().map(String::as_str).collect();
    let counters: HashSet<&str> = config.mapping.counters.iter().map(String::as_str).collect();

    if histograms.contains("") || counters.contains("") {
        errors.push(ConfigError::Validation {
            message: "mapping entries must not be empty".to_string(),
        });
    }

    let mut both: Vec<&str> = histograms.intersection(&counters).copied().collect();
    both.sort_unstable();
    for name in both {
        errors.push(ConfigError::Validation {
            message: format!(
                "metric `{name}` is mapped as both a histogram and a counter"
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &OteloutConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&OteloutConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = OteloutConfig::default();
        config.exporter.endpoint = Some("grpc://collector:4317".into());
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("exporter.endpoint"));
    }

    #[test]
    fn accepts_https_endpoint_with_whitespace() {
        let mut config = OteloutConfig::default();
        config.exporter.endpoint = Some("  https://otel.example.com:443 ".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_zero_durations() {
        let mut config = OteloutConfig::default();
        config.exporter.timeout_ms = 0;
        config.reader.interval_ms = Some(0);
        config.shutdown.timeout_ms = 0;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 3, "collects every error: {msgs:?}");
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = OteloutConfig::default();
        config.output.log_level = "verbose".into();
        assert!(messages(&config)[0].contains("output.log_level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = OteloutConfig::default();
        config.output.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_blank_meter_name() {
        let mut config = OteloutConfig::default();
        config.meter.name = "  ".into();
        assert!(messages(&config)[0].contains("meter.name"));
    }

    #[test]
    fn rejects_name_mapped_to_both_kinds() {
        let mut config = OteloutConfig::default();
        config.mapping.histograms = vec!["iteration_duration".into(), "data_sent".into()];
        config.mapping.counters = vec!["data_sent".into()];
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("`data_sent`"));
    }
}
