// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample, container, and state types shared by the output and its hosts.

use std::collections::BTreeMap;
use std::time::SystemTime;

use strum::{Display, EnumString};

/// One scalar measurement emitted by the load-testing engine.
///
/// `time` and `tags` travel with the sample but are not interpreted by the
/// translation logic.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: String,
    pub value: f64,
    pub time: Option<SystemTime>,
    pub tags: BTreeMap<String, String>,
}

impl Sample {
    /// Creates an untagged sample with no timestamp.
    pub fn new(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value,
            time: None,
            tags: BTreeMap::new(),
        }
    }

    /// Sets the observation time.
    pub fn at(mut self, time: SystemTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// A batch of samples delivered together by the host.
///
/// Containers are opaque to the output; it only asks for the flat sample list.
pub trait SampleContainer: Send + Sync {
    /// Returns the samples held by this container, in delivery order.
    fn samples(&self) -> &[Sample];
}

impl SampleContainer for Sample {
    fn samples(&self) -> &[Sample] {
        std::slice::from_ref(self)
    }
}

/// An owned list of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBatch(pub Vec<Sample>);

impl SampleContainer for SampleBatch {
    fn samples(&self) -> &[Sample] {
        &self.0
    }
}

impl From<Vec<Sample>> for SampleBatch {
    fn from(samples: Vec<Sample>) -> Self {
        Self(samples)
    }
}

/// The telemetry instrument a metric name is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum InstrumentKind {
    /// Monotonic sum; samples are added.
    Counter,
    /// Distribution; samples are recorded.
    Histogram,
}

/// Lifecycle states of an output adapter.
///
/// Transitions only move forward, except that a failed start returns
/// `Starting` to `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleState {
    Created,
    Starting,
    Started,
    Stopped,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
