// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the otelout metrics output.

use thiserror::Error;

use crate::types::{InstrumentKind, LifecycleState};

/// The primary error type used across the output adapter and its pipeline.
#[derive(Debug, Error)]
pub enum OteloutError {
    /// Configuration errors (invalid TOML, bad environment values, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// The resource descriptor could not be built. Fatal to start.
    #[error("resource creation failed: {message}")]
    ResourceCreation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The metric exporter could not be built. Fatal to start.
    #[error("exporter creation failed: {message}")]
    ExporterCreation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An instrument could not be created for a metric name.
    ///
    /// Recoverable: the offending sample is dropped and ingestion continues.
    #[error("cannot create {kind} instrument `{name}`: {reason}")]
    InstrumentCreation {
        name: String,
        kind: InstrumentKind,
        reason: String,
    },

    /// A forced collection and export did not complete.
    #[error("flush failed: {source}")]
    Flush {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The meter provider reported an error while shutting down.
    #[error("shutdown error: {source}")]
    Shutdown {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A lifecycle operation was invoked in a state that does not allow it.
    #[error("cannot {operation} output while {state}")]
    Lifecycle {
        operation: &'static str,
        state: LifecycleState,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
