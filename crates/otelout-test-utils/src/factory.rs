// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exporter factories for tests.

use std::future::{Future, ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::metrics::data::ResourceMetrics;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, Temporality};
use otelout_config::model::ExporterConfig;
use otelout_core::OteloutError;
use otelout_otlp::ExporterFactory;

/// Hands out clones of one in-memory exporter.
///
/// Clones of the factory and of the exporter share storage, so a clone kept
/// by the test sees everything the pipeline exported.
#[derive(Clone, Default)]
pub struct InMemoryExporterFactory {
    exporter: InMemoryMetricExporter,
    created: Arc<AtomicUsize>,
}

impl InMemoryExporterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared exporter storage.
    pub fn exporter(&self) -> InMemoryMetricExporter {
        self.exporter.clone()
    }

    /// Number of times [`ExporterFactory::create`] was called.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ExporterFactory for InMemoryExporterFactory {
    type Exporter = InMemoryMetricExporter;

    fn create(&self, _config: &ExporterConfig) -> Result<InMemoryMetricExporter, OteloutError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.exporter.clone())
    }
}

/// Factory whose transport construction always fails.
#[derive(Debug, Clone)]
pub struct FailingExporterFactory {
    message: String,
}

impl FailingExporterFactory {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingExporterFactory {
    fn default() -> Self {
        Self::new("collector unreachable")
    }
}

impl ExporterFactory for FailingExporterFactory {
    type Exporter = InMemoryMetricExporter;

    fn create(&self, _config: &ExporterConfig) -> Result<InMemoryMetricExporter, OteloutError> {
        tracing::debug!(message = %self.message, "failing exporter factory invoked");
        Err(OteloutError::ExporterCreation {
            message: self.message.clone(),
            source: None,
        })
    }
}

/// In-memory factory that blocks for `delay` before handing out the exporter.
#[derive(Clone)]
pub struct SlowExporterFactory {
    delay: Duration,
    inner: InMemoryExporterFactory,
}

impl SlowExporterFactory {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryExporterFactory::new(),
        }
    }

    /// Number of exporters handed out, counting only completed calls.
    pub fn created(&self) -> usize {
        self.inner.created()
    }
}

impl ExporterFactory for SlowExporterFactory {
    type Exporter = InMemoryMetricExporter;

    fn create(&self, config: &ExporterConfig) -> Result<InMemoryMetricExporter, OteloutError> {
        std::thread::sleep(self.delay);
        self.inner.create(config)
    }
}

/// How a [`ShutdownFaultExporter`] misbehaves when shut down.
#[derive(Debug, Clone)]
pub enum ShutdownFault {
    /// Blocks the shutting-down thread, then succeeds.
    Stall(Duration),
    /// Returns an SDK failure with this message.
    Fail(String),
}

/// Exporter that accepts every export but misbehaves on shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownFaultExporter {
    fault: ShutdownFault,
}

impl ShutdownFaultExporter {
    fn shut_down(&self) -> OTelSdkResult {
        match &self.fault {
            ShutdownFault::Stall(delay) => {
                std::thread::sleep(*delay);
                Ok(())
            }
            ShutdownFault::Fail(message) => Err(OTelSdkError::InternalFailure(message.clone())),
        }
    }
}

impl PushMetricExporter for ShutdownFaultExporter {
    fn export(&self, _metrics: &ResourceMetrics) -> impl Future<Output = OTelSdkResult> + Send {
        ready(Ok(()))
    }

    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }

    fn shutdown_with_timeout(&self, _timeout: Duration) -> OTelSdkResult {
        self.shut_down()
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.shut_down()
    }

    fn temporality(&self) -> Temporality {
        Temporality::Cumulative
    }
}

/// Factory producing a [`ShutdownFaultExporter`].
#[derive(Debug, Clone)]
pub struct ShutdownFaultFactory {
    fault: ShutdownFault,
}

impl ShutdownFaultFactory {
    pub fn new(fault: ShutdownFault) -> Self {
        Self { fault }
    }
}

impl ExporterFactory for ShutdownFaultFactory {
    type Exporter = ShutdownFaultExporter;

    fn create(&self, _config: &ExporterConfig) -> Result<ShutdownFaultExporter, OteloutError> {
        Ok(ShutdownFaultExporter {
            fault: self.fault.clone(),
        })
    }
}
