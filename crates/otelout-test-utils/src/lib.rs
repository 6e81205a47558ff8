// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for otelout integration tests.
//!
//! Provides in-memory exporter factories and a recording diagnostic sink so
//! the output can be exercised end to end without a collector.
//!
//! # Components
//!
//! - [`RecordingSink`] - Diagnostic sink capturing every line
//! - [`InMemoryExporterFactory`] - Exporter factory whose output can be inspected
//! - [`FailingExporterFactory`] - Exporter factory that always fails
//! - [`SlowExporterFactory`] - In-memory factory that blocks before returning
//! - [`ShutdownFaultFactory`] - Exporter that stalls or fails on shutdown
//! - [`TestHarness`] - An output wired to the above

pub mod exported;
pub mod factory;
pub mod harness;
pub mod sink;

pub use exported::{ExportedPoint, ExportedValue, latest_points};
pub use factory::{
    FailingExporterFactory, InMemoryExporterFactory, ShutdownFault, ShutdownFaultExporter,
    ShutdownFaultFactory, SlowExporterFactory,
};
pub use harness::TestHarness;
pub use sink::RecordingSink;
