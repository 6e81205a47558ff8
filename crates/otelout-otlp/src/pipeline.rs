// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export transport construction and the provider that owns it.

use std::collections::HashMap;

use opentelemetry::InstrumentationScope;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry_otlp::{
    MetricExporter, Protocol, WithExportConfig, WithHttpConfig, WithTonicConfig,
};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider, Temporality};
use otelout_config::OteloutConfig;
use otelout_config::model::{
    ExportProtocol, ExporterConfig, ReaderConfig, TemporalityPreference,
};
use otelout_core::OteloutError;
use tonic::metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue};

use crate::kv::parse_headers;
use crate::registry::InstrumentRegistry;
use crate::resource::build_resource;

/// Path of the metrics signal on an OTLP/HTTP collector.
const METRICS_PATH: &str = "/v1/metrics";

/// Builds the push exporter wrapped by the periodic reader.
///
/// Runs on a blocking thread during start.
pub trait ExporterFactory: Send + Sync + 'static {
    type Exporter: PushMetricExporter;

    fn create(&self, config: &ExporterConfig) -> Result<Self::Exporter, OteloutError>;
}

/// OTLP exporter factory, gRPC or HTTP/protobuf per `exporter.protocol`.
///
/// The gRPC channel is connected lazily and needs a Tokio runtime context
/// at creation.
#[derive(Debug, Default, Clone, Copy)]
pub struct OtlpExporterFactory;

impl ExporterFactory for OtlpExporterFactory {
    type Exporter = MetricExporter;

    fn create(&self, config: &ExporterConfig) -> Result<MetricExporter, OteloutError> {
        let headers = match config.headers.as_deref() {
            Some(raw) => parse_headers(raw).map_err(|e| OteloutError::ExporterCreation {
                message: format!("invalid exporter headers: {e}"),
                source: Some(Box::new(e)),
            })?,
            None => Vec::new(),
        };

        let built = match config.protocol {
            ExportProtocol::Grpc => {
                let mut builder = MetricExporter::builder()
                    .with_temporality(temporality(config.temporality))
                    .with_tonic()
                    .with_timeout(config.timeout());
                if let Some(endpoint) = config.endpoint.as_deref() {
                    builder = builder.with_endpoint(exporter_endpoint(config.protocol, endpoint));
                }
                if !headers.is_empty() {
                    builder = builder.with_metadata(grpc_metadata(&headers)?);
                }
                builder.build()
            }
            ExportProtocol::HttpProtobuf => {
                let mut builder = MetricExporter::builder()
                    .with_temporality(temporality(config.temporality))
                    .with_http()
                    .with_protocol(Protocol::HttpBinary)
                    .with_timeout(config.timeout());
                if let Some(endpoint) = config.endpoint.as_deref() {
                    builder = builder.with_endpoint(exporter_endpoint(config.protocol, endpoint));
                }
                if !headers.is_empty() {
                    builder = builder.with_headers(headers.into_iter().collect::<HashMap<_, _>>());
                }
                builder.build()
            }
        };

        built.map_err(|e| OteloutError::ExporterCreation {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

/// Converts decoded headers into gRPC request metadata. Keys are lowercased.
pub fn grpc_metadata(headers: &[(String, String)]) -> Result<MetadataMap, OteloutError> {
    let mut metadata = MetadataMap::with_capacity(headers.len());
    for (key, value) in headers {
        let lowered = key.to_ascii_lowercase();
        let name = MetadataKey::<Ascii>::from_bytes(lowered.as_bytes()).map_err(|e| {
            OteloutError::ExporterCreation {
                message: format!("header `{key}` is not a valid gRPC metadata key"),
                source: Some(Box::new(e)),
            }
        })?;
        let value = MetadataValue::<Ascii>::try_from(value.as_str()).map_err(|e| {
            OteloutError::ExporterCreation {
                message: format!("header `{key}` has a value not allowed in gRPC metadata"),
                source: Some(Box::new(e)),
            }
        })?;
        metadata.insert(name, value);
    }
    Ok(metadata)
}

/// Maps the configured preference onto the SDK temporality.
pub fn temporality(preference: TemporalityPreference) -> Temporality {
    match preference {
        TemporalityPreference::Cumulative => Temporality::Cumulative,
        TemporalityPreference::Delta => Temporality::Delta,
        TemporalityPreference::LowMemory => Temporality::LowMemory,
    }
}

/// Endpoint handed to the exporter. gRPC takes the collector URL as is.
pub fn exporter_endpoint(protocol: ExportProtocol, endpoint: &str) -> String {
    match protocol {
        ExportProtocol::Grpc => endpoint.trim().to_string(),
        ExportProtocol::HttpProtobuf => metrics_endpoint(endpoint),
    }
}

/// Appends the metrics signal path to a collector base URL when missing.
pub fn metrics_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with(METRICS_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{METRICS_PATH}")
    }
}

/// A running provider with its periodic reader and instrument cache.
///
/// Dropping the pipeline without [`shutdown`](Self::shutdown) leaves the
/// final export to the SDK's drop handling.
pub struct ExportPipeline {
    provider: SdkMeterProvider,
    registry: InstrumentRegistry,
}

impl ExportPipeline {
    /// Wires `exporter` into a periodic reader and a provider for `resource`.
    pub fn build<E: PushMetricExporter>(
        resource: Resource,
        exporter: E,
        reader: &ReaderConfig,
        meter_name: &str,
    ) -> Self {
        let mut reader_builder = PeriodicReader::builder(exporter);
        if let Some(interval) = reader.interval() {
            reader_builder = reader_builder.with_interval(interval);
        }

        let provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader_builder.build())
            .build();

        let scope = InstrumentationScope::builder(meter_name.to_string())
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();
        let registry = InstrumentRegistry::new(provider.meter_with_scope(scope));

        Self { provider, registry }
    }

    /// Builds resource then exporter from `config`; nothing survives a failure.
    pub fn from_config<F: ExporterFactory>(
        config: &OteloutConfig,
        factory: &F,
    ) -> Result<Self, OteloutError> {
        let resource = build_resource(&config.resource)?;
        let exporter = factory.create(&config.exporter)?;
        Ok(Self::build(
            resource,
            exporter,
            &config.reader,
            &config.meter.name,
        ))
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    /// Collects and exports now. Blocks until the exporter returns.
    pub fn flush(&self) -> Result<(), OteloutError> {
        self.provider
            .force_flush()
            .map_err(|e| OteloutError::Flush {
                source: Box::new(e),
            })
    }

    /// Runs the final collection and export, then stops the reader.
    /// Blocks until the exporter returns.
    pub fn shutdown(&self) -> Result<(), OteloutError> {
        self.provider
            .shutdown()
            .map_err(|e| OteloutError::Shutdown {
                source: Box::new(e),
            })
    }
}
