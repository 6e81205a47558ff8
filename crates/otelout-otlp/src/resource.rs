// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource descriptor attached to every exported data point.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use otelout_config::model::ResourceConfig;
use otelout_core::OteloutError;

use crate::kv::parse_key_values;

/// Builds the resource from SDK defaults plus configured overrides.
///
/// The SDK detectors contribute `OTEL_SERVICE_NAME`, `OTEL_RESOURCE_ATTRIBUTES`
/// and the `telemetry.sdk.*` attributes. Configured attributes are merged on
/// top, and a configured service name wins over everything.
pub fn build_resource(config: &ResourceConfig) -> Result<Resource, OteloutError> {
    let mut builder = Resource::builder();

    if let Some(raw) = config.attributes.as_deref() {
        let attributes = parse_key_values(raw).map_err(|e| OteloutError::ResourceCreation {
            message: format!("invalid resource attributes: {e}"),
            source: Some(Box::new(e)),
        })?;
        builder = builder.with_attributes(
            attributes
                .into_iter()
                .map(|(key, value)| KeyValue::new(key, value)),
        );
    }

    if let Some(name) = config.service_name.as_deref() {
        builder = builder.with_service_name(name.to_string());
    }

    Ok(builder.build())
}
