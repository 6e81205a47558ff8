// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end ingestion tests against an in-memory exporter.

use std::sync::Arc;

use otelout_core::{
    DiagnosticCategory, InstrumentKind, OutputAdapter, Sample, SampleBatch, SampleContainer,
};
use otelout_test_utils::{ExportedValue, TestHarness};

#[tokio::test]
async fn k6_http_samples_export_one_point_each() {
    let harness = TestHarness::started().await.expect("start");
    harness.ingest(vec![
        Sample::new("http_req_duration", 120.5),
        Sample::new("http_reqs", 1.0),
        Sample::new("unknown_metric", 99.0),
    ]);
    harness.output.stop().await.expect("stop");

    let points = harness.exported();
    assert_eq!(points.len(), 2, "{points:?}");
    assert_eq!(points[0].name, "http_req_duration");
    assert_eq!(
        points[0].value,
        ExportedValue::Histogram {
            count: 1,
            sum: 120.5
        }
    );
    assert_eq!(points[1].name, "http_reqs");
    assert_eq!(points[1].value, ExportedValue::Sum(1.0));
    assert!(points.iter().all(|p| p.name != "unknown_metric"));
    assert!(points.iter().all(|p| p.scope == "k6.metrics"));
}

#[tokio::test]
async fn unrecognized_names_are_silent() {
    let harness = TestHarness::started().await.expect("start");
    let before = harness.sink.len();
    harness.ingest(vec![
        Sample::new("vus", 10.0),
        Sample::new("data_received", 2048.0),
    ]);
    assert_eq!(harness.sink.len(), before);
    assert!(harness.output.registered_instruments().is_empty());
    harness.output.stop().await.expect("stop");
    assert!(harness.exported().is_empty());
}

#[tokio::test]
async fn values_are_recorded_unmodified() {
    let harness = TestHarness::started().await.expect("start");
    harness.ingest(vec![
        Sample::new("http_req_duration", 0.25),
        Sample::new("http_req_duration", 1999.75),
        Sample::new("http_reqs", 1.0),
        Sample::new("http_reqs", 1.0),
        Sample::new("http_reqs", 1.0),
    ]);
    harness.output.stop().await.expect("stop");

    let points = harness.exported();
    assert_eq!(
        points[0].value,
        ExportedValue::Histogram {
            count: 2,
            sum: 2000.0
        }
    );
    assert_eq!(points[1].value, ExportedValue::Sum(3.0));
}

#[tokio::test]
async fn containers_are_flattened_in_order() {
    let harness = TestHarness::started().await.expect("start");
    let containers: Vec<Box<dyn SampleContainer>> = vec![
        Box::new(Sample::new("http_reqs", 1.0)),
        Box::new(SampleBatch::from(vec![
            Sample::new("http_reqs", 1.0),
            Sample::new("http_req_duration", 42.0),
        ])),
        Box::new(SampleBatch::default()),
    ];
    harness.output.add_samples(&containers);
    assert_eq!(
        harness.output.registered_instruments(),
        vec![
            ("http_req_duration".to_string(), InstrumentKind::Histogram),
            ("http_reqs".to_string(), InstrumentKind::Counter),
        ]
    );
    harness.output.stop().await.expect("stop");
    assert_eq!(harness.exported()[1].value, ExportedValue::Sum(2.0));
}

#[tokio::test]
async fn configured_mapping_extends_routing() {
    let harness = TestHarness::builder()
        .with_histogram("http_req_waiting")
        .with_counter("iterations")
        .build();
    harness.output.start().await.expect("start");
    harness.ingest(vec![
        Sample::new("http_req_waiting", 7.5),
        Sample::new("iterations", 1.0),
    ]);
    harness.output.stop().await.expect("stop");

    let points = harness.exported();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].name, "http_req_waiting");
    assert_eq!(points[1].name, "iterations");
}

#[tokio::test]
async fn invalid_instrument_name_drops_sample_and_continues() {
    let harness = TestHarness::builder().with_counter("bad name").build();
    harness.output.start().await.expect("start");
    harness.ingest(vec![
        Sample::new("bad name", 1.0),
        Sample::new("http_reqs", 1.0),
    ]);

    let lines = harness.sink.lines_in(DiagnosticCategory::Instrument);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("bad name"));

    harness.output.stop().await.expect("stop");
    let points = harness.exported();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].name, "http_reqs");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_share_instruments() {
    let harness = Arc::new(TestHarness::started().await.expect("start"));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move {
                for _ in 0..50 {
                    harness.ingest(vec![
                        Sample::new("http_reqs", 1.0),
                        Sample::new("http_req_duration", 2.0),
                    ]);
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("producer task");
    }

    assert_eq!(harness.output.registered_instruments().len(), 2);
    harness.output.stop().await.expect("stop");

    let points = harness.exported();
    assert_eq!(
        points[0].value,
        ExportedValue::Histogram {
            count: 400,
            sum: 800.0
        }
    );
    assert_eq!(points[1].value, ExportedValue::Sum(400.0));
}
