// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the otelout metrics output.
//!
//! This crate provides the sample types a load-testing host hands to the
//! output, the adapter traits the output implements, the shared error type,
//! and the diagnostic sink interface.

pub mod diagnostic;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use diagnostic::{DiagnosticCategory, DiagnosticSink, TracingSink, WriterSink};
pub use error::OteloutError;
pub use types::{
    HealthStatus, InstrumentKind, LifecycleState, Sample, SampleBatch, SampleContainer,
};

pub use traits::{OutputAdapter, PluginAdapter};
