// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenTelemetry metrics output for load-test samples.
//!
//! [`OtelOutput`] receives sample containers from a load-testing host,
//! routes each sample by metric name to a counter or histogram, and exports
//! the aggregated results over OTLP (gRPC or HTTP/protobuf) with a periodic reader. The
//! adapter owns its meter provider; nothing is installed globally.

pub mod kv;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod resource;
pub mod translate;

pub use output::OtelOutput;
pub use pipeline::{ExportPipeline, ExporterFactory, OtlpExporterFactory};
pub use registry::{Instrument, InstrumentRegistry};
pub use resource::build_resource;
pub use translate::{MetricMapping, SampleTranslator, TranslateOutcome};
