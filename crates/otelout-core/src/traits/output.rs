// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output adapter trait: the contract a load-testing host drives.

use async_trait::async_trait;

use crate::error::OteloutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SampleContainer;

/// Adapter that republishes measurement samples to a telemetry backend.
///
/// The host calls [`start`](OutputAdapter::start) once, then
/// [`add_samples`](OutputAdapter::add_samples) any number of times from any
/// number of tasks, then [`stop`](OutputAdapter::stop) once after ingestion
/// has ceased.
#[async_trait]
pub trait OutputAdapter: PluginAdapter {
    /// Returns a short static identifier for this output.
    fn description(&self) -> &str;

    /// Builds the export pipeline. On error the adapter stays unstarted.
    async fn start(&self) -> Result<(), OteloutError>;

    /// Records every sample of every container.
    ///
    /// Never blocks on the network and never fails: per-sample problems are
    /// reported on the adapter's diagnostic channel.
    fn add_samples(&self, containers: &[Box<dyn SampleContainer>]);

    /// Flushes and shuts down the export pipeline.
    ///
    /// The adapter is stopped once this returns, whatever the result.
    async fn stop(&self) -> Result<(), OteloutError>;
}
