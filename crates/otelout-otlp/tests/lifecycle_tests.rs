// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle state machine tests for the OTel output.

use std::sync::Arc;
use std::time::Duration;

use otelout_config::OteloutConfig;
use otelout_core::{
    DiagnosticCategory, HealthStatus, LifecycleState, OteloutError, OutputAdapter, PluginAdapter,
    Sample,
};
use otelout_otlp::OtelOutput;
use otelout_test_utils::{
    FailingExporterFactory, RecordingSink, ShutdownFault, ShutdownFaultFactory,
    SlowExporterFactory, TestHarness,
};

#[tokio::test]
async fn stop_before_start_is_rejected() {
    let harness = TestHarness::builder().build();
    let err = harness.output.stop().await.expect_err("not started");
    assert!(matches!(
        err,
        OteloutError::Lifecycle {
            operation: "stop",
            state: LifecycleState::Created
        }
    ));
    assert_eq!(harness.output.state(), LifecycleState::Created);
    assert_eq!(harness.export_count(), 0);
}

#[tokio::test]
async fn second_start_leaves_first_pipeline_running() {
    let harness = TestHarness::started().await.expect("start");
    harness.ingest(vec![Sample::new("http_reqs", 1.0)]);

    let err = harness.output.start().await.expect_err("already started");
    assert!(matches!(
        err,
        OteloutError::Lifecycle {
            operation: "start",
            state: LifecycleState::Started
        }
    ));
    assert_eq!(harness.factory.created(), 1);

    harness.ingest(vec![Sample::new("http_reqs", 1.0)]);
    harness.output.stop().await.expect("stop");

    let points = harness.exported();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value, otelout_test_utils::ExportedValue::Sum(2.0));
}

#[tokio::test]
async fn second_stop_is_rejected_without_another_export() {
    let harness = TestHarness::started().await.expect("start");
    harness.ingest(vec![Sample::new("http_req_duration", 10.0)]);
    harness.output.stop().await.expect("first stop");
    let exports = harness.export_count();
    assert!(exports >= 1);

    let err = harness.output.stop().await.expect_err("already stopped");
    assert!(matches!(
        err,
        OteloutError::Lifecycle {
            operation: "stop",
            state: LifecycleState::Stopped
        }
    ));
    assert_eq!(harness.export_count(), exports);
    assert_eq!(harness.output.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn samples_after_stop_are_not_exported() {
    let harness = TestHarness::started().await.expect("start");
    harness.output.stop().await.expect("stop");
    let exports = harness.export_count();

    harness.ingest(vec![Sample::new("http_reqs", 5.0)]);
    assert_eq!(harness.export_count(), exports);
    assert_eq!(harness.sink.lines_in(DiagnosticCategory::Lifecycle).len(), 1);
    assert!(harness.output.registered_instruments().is_empty());
}

#[tokio::test]
async fn start_cannot_restart_a_stopped_output() {
    let harness = TestHarness::started().await.expect("start");
    harness.output.stop().await.expect("stop");
    assert!(matches!(
        harness.output.start().await,
        Err(OteloutError::Lifecycle {
            operation: "start",
            state: LifecycleState::Stopped
        })
    ));
}

#[tokio::test]
async fn exporter_failure_keeps_output_created_and_reports() {
    let sink = Arc::new(RecordingSink::new());
    let output = OtelOutput::with_factory(
        OteloutConfig::default(),
        sink.clone(),
        FailingExporterFactory::new("dial tcp: connection refused"),
    );

    let err = output.start().await.expect_err("factory fails");
    assert!(matches!(err, OteloutError::ExporterCreation { .. }));
    assert_eq!(output.state(), LifecycleState::Created);

    let exporter_lines = sink.lines_in(DiagnosticCategory::Exporter);
    assert_eq!(exporter_lines.len(), 1);
    assert!(exporter_lines[0].contains("connection refused"));

    // A failed start may be retried and fails the same way.
    assert!(output.start().await.is_err());
    assert!(matches!(
        output.stop().await,
        Err(OteloutError::Lifecycle { .. })
    ));
}

#[tokio::test]
async fn resource_failure_is_reported_before_export() {
    let mut config = OteloutConfig::default();
    config.resource.attributes = Some("environment".into());
    let harness = TestHarness::builder().with_config(config).build();

    let err = harness.output.start().await.expect_err("bad attributes");
    assert!(matches!(err, OteloutError::ResourceCreation { .. }));
    assert_eq!(harness.factory.created(), 0);
    assert_eq!(harness.sink.lines_in(DiagnosticCategory::Resource).len(), 1);
}

#[tokio::test]
async fn start_echoes_config_with_masked_headers() {
    let mut config = OteloutConfig::default();
    config.exporter.headers = Some("api-key=super-secret".into());
    config.resource.service_name = Some("checkout".into());
    let harness = TestHarness::builder().with_config(config).build();
    harness.output.start().await.expect("start");

    let lines = harness.sink.lines_in(DiagnosticCategory::Config);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("headers=api-key=***"), "{}", lines[0]);
    assert!(lines[0].contains("service_name=checkout"));
    assert!(lines[0].contains("protocol=grpc"), "{}", lines[0]);
    assert!(!lines[0].contains("super-secret"));
    harness.output.stop().await.expect("stop");
}

#[tokio::test]
async fn health_follows_lifecycle() {
    let harness = TestHarness::builder().build();
    assert!(matches!(
        harness.output.health_check().await,
        Ok(HealthStatus::Degraded(_))
    ));
    harness.output.start().await.expect("start");
    assert_eq!(harness.output.health_check().await.ok(), Some(HealthStatus::Healthy));
    harness.output.stop().await.expect("stop");
    assert!(matches!(
        harness.output.health_check().await,
        Ok(HealthStatus::Unhealthy(_))
    ));
}

#[tokio::test]
async fn flush_exports_while_running() {
    let harness = TestHarness::started().await.expect("start");
    harness.ingest(vec![Sample::new("http_reqs", 3.0)]);
    harness.output.flush().await.expect("flush");
    assert_eq!(harness.export_count(), 1);
    assert_eq!(
        harness.exported()[0].value,
        otelout_test_utils::ExportedValue::Sum(3.0)
    );
    harness.output.stop().await.expect("stop");
}

#[tokio::test]
async fn cancelled_start_returns_to_created() {
    let sink = Arc::new(RecordingSink::new());
    let output = OtelOutput::with_factory(
        OteloutConfig::default(),
        sink.clone(),
        SlowExporterFactory::new(Duration::from_millis(300)),
    );

    let cancelled = tokio::time::timeout(Duration::from_millis(50), output.start()).await;
    assert!(cancelled.is_err(), "start should still be building");
    assert_eq!(output.state(), LifecycleState::Created);
    assert_eq!(sink.lines_in(DiagnosticCategory::Lifecycle).len(), 1);

    assert!(matches!(
        output.stop().await,
        Err(OteloutError::Lifecycle {
            operation: "stop",
            state: LifecycleState::Created
        })
    ));

    output.start().await.expect("restart after cancellation");
    assert_eq!(output.state(), LifecycleState::Started);
    output.stop().await.expect("stop");
}

fn shutdown_config(timeout_ms: u64) -> OteloutConfig {
    let mut config = OteloutConfig::default();
    config.reader.interval_ms = Some(3_600_000);
    config.shutdown.timeout_ms = timeout_ms;
    config
}

#[tokio::test]
async fn stalled_shutdown_times_out_and_still_stops() {
    let sink = Arc::new(RecordingSink::new());
    let output = OtelOutput::with_factory(
        shutdown_config(100),
        sink.clone(),
        ShutdownFaultFactory::new(ShutdownFault::Stall(Duration::from_secs(1))),
    );
    output.start().await.expect("start");

    let err = output.stop().await.expect_err("exporter stalls");
    assert!(matches!(err, OteloutError::Timeout { duration } if duration == Duration::from_millis(100)));
    assert_eq!(output.state(), LifecycleState::Stopped);

    let lines = sink.lines_in(DiagnosticCategory::Shutdown);
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].starts_with("shutdown: "), "{}", lines[0]);
}

#[tokio::test]
async fn failed_shutdown_is_returned_and_still_stops() {
    let sink = Arc::new(RecordingSink::new());
    let output = OtelOutput::with_factory(
        shutdown_config(5_000),
        sink.clone(),
        ShutdownFaultFactory::new(ShutdownFault::Fail("collector closed the stream".into())),
    );
    output.start().await.expect("start");

    let err = output.stop().await.expect_err("exporter fails");
    assert!(matches!(err, OteloutError::Shutdown { .. }), "{err:?}");
    assert_eq!(output.state(), LifecycleState::Stopped);

    let lines = sink.lines_in(DiagnosticCategory::Shutdown);
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].starts_with("shutdown: "), "{}", lines[0]);
}
