// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./otelout.toml` > `~/.config/otelout/otelout.toml` >
//! `/etc/otelout/otelout.toml`, then the standard OpenTelemetry environment
//! variables, then `OTELOUT_*` overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::collections::BTreeMap;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Serialize;

use crate::model::OteloutConfig;

/// How an OpenTelemetry variable's value reaches its config key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvKind {
    /// Passed through verbatim, whatever it looks like.
    Text,
    /// Milliseconds; non-numeric input is kept as text and fails extraction.
    Millis,
}

/// Standard OpenTelemetry variables and the config keys they populate.
///
/// Time values keep the OpenTelemetry unit (milliseconds).
const OTEL_ENV_KEYS: &[(&str, &str, EnvKind)] = &[
    ("OTEL_EXPORTER_OTLP_ENDPOINT", "exporter.endpoint", EnvKind::Text),
    ("OTEL_EXPORTER_OTLP_PROTOCOL", "exporter.protocol", EnvKind::Text),
    ("OTEL_EXPORTER_OTLP_HEADERS", "exporter.headers", EnvKind::Text),
    ("OTEL_EXPORTER_OTLP_TIMEOUT", "exporter.timeout_ms", EnvKind::Millis),
    (
        "OTEL_EXPORTER_OTLP_METRICS_TEMPORALITY_PREFERENCE",
        "exporter.temporality",
        EnvKind::Text,
    ),
    ("OTEL_SERVICE_NAME", "resource.service_name", EnvKind::Text),
    ("OTEL_RESOURCE_ATTRIBUTES", "resource.attributes", EnvKind::Text),
    ("OTEL_METRIC_EXPORT_INTERVAL", "reader.interval_ms", EnvKind::Millis),
    ("METER_NAME", "meter.name", EnvKind::Text),
];

/// A value read from an OpenTelemetry variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum EnvValue {
    Text(String),
    Number(u64),
}

impl EnvKind {
    fn value(self, raw: &str) -> EnvValue {
        let raw = raw.trim();
        match self {
            EnvKind::Millis => raw
                .parse()
                .map(EnvValue::Number)
                .unwrap_or_else(|_| EnvValue::Text(raw.to_string())),
            EnvKind::Text => EnvValue::Text(raw.to_string()),
        }
    }
}

/// Top-level sections addressable through `OTELOUT_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "output", "exporter", "resource", "meter", "reader", "shutdown", "mapping",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/otelout/otelout.toml` (system-wide)
/// 3. `~/.config/otelout/otelout.toml` (user XDG config)
/// 4. `./otelout.toml` (local directory)
/// 5. `OTEL_*` / `METER_NAME` environment variables
/// 6. `OTELOUT_*` environment variables
pub fn load_config() -> Result<OteloutConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no environment).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<OteloutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OteloutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OteloutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OteloutConfig::default()))
        .merge(Toml::file(path))
        .merge(otel_env_provider())
        .merge(otelout_env_provider())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OteloutConfig::default()))
        .merge(Toml::file("/etc/otelout/otelout.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("otelout/otelout.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("otelout.toml"))
        .merge(otel_env_provider())
        .merge(otelout_env_provider())
}

/// Map the standard OpenTelemetry variables onto config keys.
///
/// Values are not type-guessed: `OTEL_SERVICE_NAME=12345` stays the string
/// `"12345"`. Unset or empty variables are skipped.
fn otel_env_provider() -> Serialized<BTreeMap<String, BTreeMap<String, EnvValue>>> {
    Serialized::defaults(otel_env_values(|var| std::env::var(var).ok()))
}

fn otel_env_values(
    lookup: impl Fn(&str) -> Option<String>,
) -> BTreeMap<String, BTreeMap<String, EnvValue>> {
    let mut sections: BTreeMap<String, BTreeMap<String, EnvValue>> = BTreeMap::new();
    for (var, path, kind) in OTEL_ENV_KEYS {
        let Some(raw) = lookup(var).filter(|raw| !raw.trim().is_empty()) else {
            continue;
        };
        let Some((section, key)) = path.split_once('.') else {
            continue;
        };
        sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), kind.value(&raw));
    }
    sections
}

/// Create the `OTELOUT_` provider, mapping the first segment to a section.
///
/// `OTELOUT_EXPORTER_TIMEOUT_MS` maps to `exporter.timeout_ms`, not
/// `exporter.timeout.ms`: only the section boundary becomes a dot.
fn otelout_env_provider() -> Env {
    Env::prefixed("OTELOUT_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        match key_str.split_once('_') {
            Some((section, rest)) if SECTIONS.contains(&section) => {
                format!("{section}.{rest}").into()
            }
            _ => key_str.into(),
        }
    })
}
