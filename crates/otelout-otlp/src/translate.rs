// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of samples to instruments by metric name.

use std::collections::HashMap;

use otelout_config::model::MappingConfig;
use otelout_core::{InstrumentKind, OteloutError, Sample};

use crate::registry::InstrumentRegistry;

/// Name to instrument-kind routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricMapping {
    table: HashMap<String, InstrumentKind>,
}

impl MetricMapping {
    /// The built-in k6 routes: request duration as a histogram and request
    /// count as a counter.
    pub fn k6_defaults() -> Self {
        Self {
            table: HashMap::from([
                ("http_req_duration".to_string(), InstrumentKind::Histogram),
                ("http_reqs".to_string(), InstrumentKind::Counter),
            ]),
        }
    }

    /// An empty table. Every sample is ignored.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Adds or replaces a route.
    pub fn with(mut self, name: impl Into<String>, kind: InstrumentKind) -> Self {
        self.table.insert(name.into(), kind);
        self
    }

    /// The built-in routes extended with the configured ones.
    pub fn from_config(config: &MappingConfig) -> Self {
        let histograms = config
            .histograms
            .iter()
            .map(|name| (name, InstrumentKind::Histogram));
        let counters = config
            .counters
            .iter()
            .map(|name| (name, InstrumentKind::Counter));
        histograms
            .chain(counters)
            .fold(Self::k6_defaults(), |mapping, (name, kind)| {
                mapping.with(name.clone(), kind)
            })
    }

    pub fn kind_of(&self, name: &str) -> Option<InstrumentKind> {
        self.table.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for MetricMapping {
    fn default() -> Self {
        Self::k6_defaults()
    }
}

/// Result of translating one flat list of samples.
#[derive(Debug, Default)]
pub struct TranslateOutcome {
    pub recorded: usize,
    pub ignored: usize,
    pub errors: Vec<OteloutError>,
}

impl TranslateOutcome {
    /// Folds another outcome into this one.
    pub fn merge(&mut self, other: TranslateOutcome) {
        self.recorded += other.recorded;
        self.ignored += other.ignored;
        self.errors.extend(other.errors);
    }
}

/// Applies a [`MetricMapping`] to samples. Holds no mutable state.
#[derive(Debug, Clone, Default)]
pub struct SampleTranslator {
    mapping: MetricMapping,
}

impl SampleTranslator {
    pub fn new(mapping: MetricMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &MetricMapping {
        &self.mapping
    }

    /// Records every mapped sample, in order, with its raw value.
    ///
    /// A sample whose instrument cannot be obtained is dropped and its error
    /// collected; the remaining samples are still processed.
    pub fn translate(&self, registry: &InstrumentRegistry, samples: &[Sample]) -> TranslateOutcome {
        let mut outcome = TranslateOutcome::default();
        for sample in samples {
            let Some(kind) = self.mapping.kind_of(&sample.metric) else {
                outcome.ignored += 1;
                continue;
            };
            match registry.instrument(&sample.metric, kind) {
                Ok(instrument) => {
                    instrument.record(sample.value);
                    outcome.recorded += 1;
                }
                Err(e) => outcome.errors.push(e),
            }
        }
        outcome
    }
}
