// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that every output adapter implements.

use async_trait::async_trait;

use crate::error::OteloutError;
use crate::types::HealthStatus;

/// The base trait for otelout adapters.
///
/// Provides identity and health check capabilities independent of the
/// adapter's lifecycle operations.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, OteloutError>;
}
