// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness driving an output against an in-memory exporter.
//!
//! `TestHarness` wires an [`OtelOutput`] to an [`InMemoryExporterFactory`]
//! and a [`RecordingSink`], and exposes what was exported and reported.

use std::sync::Arc;

use otelout_config::OteloutConfig;
use otelout_core::{OteloutError, OutputAdapter, Sample, SampleBatch, SampleContainer};
use otelout_otlp::OtelOutput;

use crate::exported::{ExportedPoint, latest_points};
use crate::factory::InMemoryExporterFactory;
use crate::sink::RecordingSink;

/// Reader interval long enough that only explicit flushes and the final
/// shutdown export run during a test.
const QUIET_INTERVAL_MS: u64 = 3_600_000;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: OteloutConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = OteloutConfig::default();
        config.reader.interval_ms = Some(QUIET_INTERVAL_MS);
        Self { config }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: OteloutConfig) -> Self {
        self.config = config;
        self
    }

    /// Route an extra metric name to a histogram.
    pub fn with_histogram(mut self, name: &str) -> Self {
        self.config.mapping.histograms.push(name.to_string());
        self
    }

    /// Route an extra metric name to a counter.
    pub fn with_counter(mut self, name: &str) -> Self {
        self.config.mapping.counters.push(name.to_string());
        self
    }

    /// Set the meter name.
    pub fn with_meter_name(mut self, name: &str) -> Self {
        self.config.meter.name = name.to_string();
        self
    }

    /// Build the harness. The output is not started.
    pub fn build(self) -> TestHarness {
        let factory = InMemoryExporterFactory::new();
        let sink = Arc::new(RecordingSink::new());
        let output = OtelOutput::with_factory(self.config, sink.clone(), factory.clone());
        TestHarness {
            output,
            factory,
            sink,
        }
    }
}

/// An output wired to in-memory collaborators.
pub struct TestHarness {
    /// The output under test.
    pub output: OtelOutput<InMemoryExporterFactory>,
    /// Shares exporter storage with the factory inside the output.
    pub factory: InMemoryExporterFactory,
    /// Every diagnostic line the output wrote.
    pub sink: Arc<RecordingSink>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Build and start a harness with default settings.
    pub async fn started() -> Result<TestHarness, OteloutError> {
        let harness = Self::builder().build();
        harness.output.start().await?;
        Ok(harness)
    }

    /// Deliver samples as one batch container.
    pub fn ingest(&self, samples: Vec<Sample>) {
        let containers: Vec<Box<dyn SampleContainer>> = vec![Box::new(SampleBatch::from(samples))];
        self.output.add_samples(&containers);
    }

    /// Points from the most recent export.
    pub fn exported(&self) -> Vec<ExportedPoint> {
        latest_points(&self.factory.exporter())
    }

    /// Number of export batches received so far.
    pub fn export_count(&self) -> usize {
        self.factory
            .exporter()
            .get_finished_metrics()
            .map(|batches| batches.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use otelout_core::LifecycleState;

    use super::*;

    #[tokio::test]
    async fn builder_applies_mapping_and_quiet_interval() {
        let harness = TestHarness::builder()
            .with_counter("iterations")
            .with_meter_name("harness")
            .build();
        assert_eq!(harness.output.state(), LifecycleState::Created);
        assert_eq!(harness.factory.created(), 0);

        harness.output.start().await.expect("start");
        assert_eq!(harness.factory.created(), 1);
        harness.ingest(vec![Sample::new("iterations", 1.0)]);
        harness.output.stop().await.expect("stop");

        let points = harness.exported();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "iterations");
        assert_eq!(points[0].scope, "harness");
    }
}
