// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazily created, cached instruments keyed by metric name.
//!
//! A name is bound to one instrument kind for the registry's lifetime. A
//! request for the same name with the other kind fails and the first
//! instrument stays in place.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use otelout_core::{InstrumentKind, OteloutError};

/// Longest instrument name accepted by the OpenTelemetry API.
const MAX_NAME_LEN: usize = 255;

/// A typed handle recording into one metric stream.
#[derive(Clone)]
pub enum Instrument {
    Counter(Counter<f64>),
    Histogram(Histogram<f64>),
}

impl Instrument {
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Instrument::Counter(_) => InstrumentKind::Counter,
            Instrument::Histogram(_) => InstrumentKind::Histogram,
        }
    }

    /// Adds to a counter or records into a histogram, value unchanged.
    pub fn record(&self, value: f64) {
        match self {
            Instrument::Counter(counter) => counter.add(value, &[]),
            Instrument::Histogram(histogram) => histogram.record(value, &[]),
        }
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instrument").field(&self.kind()).finish()
    }
}

/// Checks a name against the OpenTelemetry instrument name syntax.
pub fn validate_instrument_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("name is longer than {MAX_NAME_LEN} characters"));
    }
    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err("name must start with an ASCII letter".to_string());
    }
    if let Some(bad) =
        chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')))
    {
        return Err(format!("name contains invalid character `{bad}`"));
    }
    Ok(())
}

/// Fetch-or-create cache of instruments for one meter.
///
/// Creation runs under the map's per-key entry lock, so concurrent first
/// references to a name build exactly one instrument.
pub struct InstrumentRegistry {
    meter: Meter,
    instruments: DashMap<String, Instrument>,
    created: AtomicUsize,
}

impl InstrumentRegistry {
    pub fn new(meter: Meter) -> Self {
        Self {
            meter,
            instruments: DashMap::new(),
            created: AtomicUsize::new(0),
        }
    }

    /// Returns the instrument bound to `name`, creating it on first use.
    pub fn instrument(&self, name: &str, kind: InstrumentKind) -> Result<Instrument, OteloutError> {
        if let Some(existing) = self.instruments.get(name) {
            return matching(name, kind, existing.value());
        }

        let entry = self
            .instruments
            .entry(name.to_string())
            .or_try_insert_with(|| self.create(name, kind))?;
        matching(name, kind, entry.value())
    }

    /// Number of instruments built against the meter since creation.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Registered names with their kinds, sorted by name.
    pub fn names(&self) -> Vec<(String, InstrumentKind)> {
        let mut names: Vec<(String, InstrumentKind)> = self
            .instruments
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().kind()))
            .collect();
        names.sort_by(|a, b| a.0.cmp(&b.0));
        names
    }

    fn create(&self, name: &str, kind: InstrumentKind) -> Result<Instrument, OteloutError> {
        validate_instrument_name(name).map_err(|reason| OteloutError::InstrumentCreation {
            name: name.to_string(),
            kind,
            reason,
        })?;

        let instrument = match kind {
            InstrumentKind::Counter => {
                Instrument::Counter(self.meter.f64_counter(name.to_string()).build())
            }
            InstrumentKind::Histogram => {
                Instrument::Histogram(self.meter.f64_histogram(name.to_string()).build())
            }
        };
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(name, %kind, "instrument created");
        Ok(instrument)
    }
}

fn matching(
    name: &str,
    kind: InstrumentKind,
    existing: &Instrument,
) -> Result<Instrument, OteloutError> {
    if existing.kind() == kind {
        Ok(existing.clone())
    } else {
        Err(OteloutError::InstrumentCreation {
            name: name.to_string(),
            kind,
            reason: format!("already registered as {}", existing.kind()),
        })
    }
}
