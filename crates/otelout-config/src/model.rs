// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the otelout metrics output.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level otelout configuration.
///
/// Every section is optional. An empty configuration means "use the
/// OpenTelemetry SDK defaults" for every exporter setting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OteloutConfig {
    /// Logging and diagnostic output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// OTLP exporter transport settings.
    #[serde(default)]
    pub exporter: ExporterConfig,

    /// Resource descriptor settings.
    #[serde(default)]
    pub resource: ResourceConfig,

    /// Meter (instrumentation scope) settings.
    #[serde(default)]
    pub meter: MeterConfig,

    /// Periodic reader settings.
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Shutdown settings.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Extra metric-name routing on top of the built-in table.
    #[serde(default)]
    pub mapping: MappingConfig,
}

impl OteloutConfig {
    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Where diagnostic lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticTarget {
    #[default]
    Stdout,
    Stderr,
    /// Forward diagnostic lines to the tracing subscriber.
    Log,
}

/// Logging and diagnostic output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Destination of diagnostic lines.
    #[serde(default)]
    pub diagnostics: DiagnosticTarget,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            diagnostics: DiagnosticTarget::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Aggregation temporality requested from the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalityPreference {
    #[default]
    #[serde(alias = "Cumulative", alias = "CUMULATIVE")]
    Cumulative,
    #[serde(alias = "Delta", alias = "DELTA")]
    Delta,
    #[serde(alias = "LowMemory", alias = "LOWMEMORY")]
    LowMemory,
}

/// OTLP transport used to reach the collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ExportProtocol {
    /// OTLP over gRPC, collector port 4317 by convention.
    #[default]
    #[serde(rename = "grpc")]
    Grpc,
    /// OTLP over HTTP with protobuf bodies, collector port 4318 by convention.
    #[serde(rename = "http/protobuf")]
    HttpProtobuf,
}

impl ExportProtocol {
    /// The `OTEL_EXPORTER_OTLP_PROTOCOL` spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportProtocol::Grpc => "grpc",
            ExportProtocol::HttpProtobuf => "http/protobuf",
        }
    }
}

/// OTLP exporter configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    /// Collector URL, e.g. `http://localhost:4317`. `None` uses the SDK default.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Transport protocol, `grpc` or `http/protobuf`.
    #[serde(default)]
    pub protocol: ExportProtocol,

    /// Request headers as `key=value,key2=value2`, values percent-encoded.
    #[serde(default)]
    pub headers: Option<String>,

    /// Export request timeout in milliseconds.
    #[serde(default = "default_exporter_timeout_ms")]
    pub timeout_ms: u64,

    /// Aggregation temporality.
    #[serde(default)]
    pub temporality: TemporalityPreference,
}

impl ExporterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            protocol: ExportProtocol::default(),
            headers: None,
            timeout_ms: default_exporter_timeout_ms(),
            temporality: TemporalityPreference::default(),
        }
    }
}

fn default_exporter_timeout_ms() -> u64 {
    10_000
}

/// Resource descriptor configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Overrides the detected `service.name`.
    #[serde(default)]
    pub service_name: Option<String>,

    /// Extra attributes as `key=value,key2=value2`.
    #[serde(default)]
    pub attributes: Option<String>,
}

/// Meter configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    /// Instrumentation scope name under which all instruments are created.
    #[serde(default = "default_meter_name")]
    pub name: String,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            name: default_meter_name(),
        }
    }
}

fn default_meter_name() -> String {
    "k6.metrics".to_string()
}

/// Periodic reader configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    /// Collection and export interval in milliseconds. `None` uses the SDK default.
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

impl ReaderConfig {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShutdownConfig {
    /// Upper bound on the final flush and provider shutdown, in milliseconds.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub timeout_ms: u64,
}

impl ShutdownConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

fn default_shutdown_timeout_ms() -> u64 {
    30_000
}

/// Additional metric names routed to instruments.
///
/// Names listed here extend the built-in table (`http_req_duration` as a
/// histogram, `http_reqs` as a counter).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    /// Metric names recorded into histograms.
    #[serde(default)]
    pub histograms: Vec<String>,

    /// Metric names added to counters.
    #[serde(default)]
    pub counters: Vec<String>,
}
