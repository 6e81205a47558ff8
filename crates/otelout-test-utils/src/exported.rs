// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattened view of what an in-memory exporter received.

use opentelemetry_sdk::metrics::InMemoryMetricExporter;
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, MetricData, ResourceMetrics};

/// Aggregated value of one exported f64 stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportedValue {
    Sum(f64),
    Histogram { count: u64, sum: f64 },
    /// Any other aggregation; not produced by the output.
    Other,
}

/// One data point from an export batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPoint {
    pub scope: String,
    pub name: String,
    pub value: ExportedValue,
}

/// Points from the most recent export batch.
///
/// With cumulative temporality the last batch carries every stream's
/// running total.
pub fn latest_points(exporter: &InMemoryMetricExporter) -> Vec<ExportedPoint> {
    let batches = exporter.get_finished_metrics().unwrap_or_default();
    batches.last().map(points).unwrap_or_default()
}

/// Flattens one export batch.
pub fn points(batch: &ResourceMetrics) -> Vec<ExportedPoint> {
    let mut out = Vec::new();
    for scope_metrics in batch.scope_metrics() {
        let scope = scope_metrics.scope().name().to_string();
        for metric in scope_metrics.metrics() {
            let values: Vec<ExportedValue> = match metric.data() {
                AggregatedMetrics::F64(MetricData::Sum(sum)) => sum
                    .data_points()
                    .map(|point| ExportedValue::Sum(point.value()))
                    .collect(),
                AggregatedMetrics::F64(MetricData::Histogram(histogram)) => histogram
                    .data_points()
                    .map(|point| ExportedValue::Histogram {
                        count: point.count(),
                        sum: point.sum(),
                    })
                    .collect(),
                _ => vec![ExportedValue::Other],
            };
            out.extend(values.into_iter().map(|value| ExportedPoint {
                scope: scope.clone(),
                name: metric.name().to_string(),
                value,
            }));
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
