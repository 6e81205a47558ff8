// SPDX-FileCopyrightText: 2026 Otelout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The output adapter: lifecycle state machine around one export pipeline.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use otelout_config::OteloutConfig;
use otelout_core::{
    DiagnosticCategory, DiagnosticSink, HealthStatus, InstrumentKind, LifecycleState,
    OteloutError, OutputAdapter, PluginAdapter, SampleContainer,
};

use crate::kv::mask_values;
use crate::pipeline::{ExportPipeline, ExporterFactory, OtlpExporterFactory};
use crate::translate::{MetricMapping, SampleTranslator, TranslateOutcome};

const OUTPUT_NAME: &str = "otelout";

enum State {
    Created,
    Starting,
    Started(Arc<ExportPipeline>),
    Stopped,
}

impl State {
    fn lifecycle(&self) -> LifecycleState {
        match self {
            State::Created => LifecycleState::Created,
            State::Starting => LifecycleState::Starting,
            State::Started(_) => LifecycleState::Started,
            State::Stopped => LifecycleState::Stopped,
        }
    }
}

/// Returns a `Starting` output to `Created` if start does not complete.
///
/// A start future dropped mid-build would otherwise leave the state stuck.
struct StartGuard<'a> {
    state: &'a RwLock<State>,
    sink: &'a dyn DiagnosticSink,
    armed: bool,
}

impl<'a> StartGuard<'a> {
    fn new(state: &'a RwLock<State>, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            state,
            sink,
            armed: true,
        }
    }

    /// Publishes the outcome and disarms the guard.
    fn finish(mut self, next: State) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, State::Starting) {
            *state = State::Created;
            drop(state);
            tracing::warn!("otel output start cancelled");
            self.sink
                .report(DiagnosticCategory::Lifecycle, "start cancelled before completion");
        }
    }
}

/// Republishes load-test samples through an OpenTelemetry meter provider.
///
/// The adapter owns its provider; nothing is registered globally. Lifecycle
/// errors are returned to the caller, while per-sample errors only reach the
/// diagnostic sink.
pub struct OtelOutput<F: ExporterFactory = OtlpExporterFactory> {
    config: Arc<OteloutConfig>,
    factory: Arc<F>,
    translator: SampleTranslator,
    sink: Arc<dyn DiagnosticSink>,
    state: RwLock<State>,
}

impl OtelOutput<OtlpExporterFactory> {
    /// Creates an adapter exporting over OTLP to the configured collector.
    pub fn new(config: OteloutConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::with_factory(config, sink, OtlpExporterFactory)
    }
}

impl<F: ExporterFactory> OtelOutput<F> {
    /// Creates an adapter whose exporter is built by `factory`.
    pub fn with_factory(config: OteloutConfig, sink: Arc<dyn DiagnosticSink>, factory: F) -> Self {
        let translator = SampleTranslator::new(MetricMapping::from_config(&config.mapping));
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
            translator,
            sink,
            state: RwLock::new(State::Created),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.read_state().lifecycle()
    }

    /// Instruments created so far, sorted by name. Empty unless started.
    pub fn registered_instruments(&self) -> Vec<(String, InstrumentKind)> {
        match self.pipeline() {
            Some(pipeline) => pipeline.registry().names(),
            None => Vec::new(),
        }
    }

    /// Forces the periodic reader to collect and export now.
    pub async fn flush(&self) -> Result<(), OteloutError> {
        let pipeline = self.pipeline().ok_or_else(|| OteloutError::Lifecycle {
            operation: "flush",
            state: self.state(),
        })?;
        let timeout = self.config.exporter.timeout();
        match tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || pipeline.flush()),
        )
        .await
        {
            Ok(joined) => joined.map_err(join_error)?,
            Err(_) => Err(OteloutError::Timeout { duration: timeout }),
        }
    }

    fn echo_config(&self) {
        let exporter = &self.config.exporter;
        let line = format!(
            "endpoint={} protocol={} headers={} service_name={} meter={} temporality={:?} interval_ms={}",
            exporter.endpoint.as_deref().unwrap_or("<sdk default>"),
            exporter.protocol.as_str(),
            exporter
                .headers
                .as_deref()
                .map(mask_values)
                .unwrap_or_else(|| "<none>".to_string()),
            self.config
                .resource
                .service_name
                .as_deref()
                .unwrap_or("<sdk default>"),
            self.config.meter.name,
            exporter.temporality,
            self.config
                .reader
                .interval_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "<sdk default>".to_string()),
        );
        self.sink.report(DiagnosticCategory::Config, &line);
    }

    fn report_outcome(&self, outcome: TranslateOutcome) {
        if !outcome.errors.is_empty() {
            tracing::warn!(
                dropped = outcome.errors.len(),
                recorded = outcome.recorded,
                "samples dropped during translation"
            );
        }
        for err in outcome.errors {
            self.sink
                .report(DiagnosticCategory::Instrument, &err.to_string());
        }
    }

    fn pipeline(&self) -> Option<Arc<ExportPipeline>> {
        match &*self.read_state() {
            State::Started(pipeline) => Some(Arc::clone(pipeline)),
            _ => None,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn join_error(e: tokio::task::JoinError) -> OteloutError {
    OteloutError::Internal(format!("blocking task failed: {e}"))
}

fn category_of(err: &OteloutError) -> DiagnosticCategory {
    match err {
        OteloutError::ResourceCreation { .. } => DiagnosticCategory::Resource,
        OteloutError::ExporterCreation { .. } => DiagnosticCategory::Exporter,
        OteloutError::Config(_) => DiagnosticCategory::Config,
        OteloutError::InstrumentCreation { .. } => DiagnosticCategory::Instrument,
        OteloutError::Shutdown { .. } | OteloutError::Timeout { .. } => {
            DiagnosticCategory::Shutdown
        }
        _ => DiagnosticCategory::Lifecycle,
    }
}

#[async_trait]
impl<F: ExporterFactory> PluginAdapter for OtelOutput<F> {
    fn name(&self) -> &str {
        OUTPUT_NAME
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, OteloutError> {
        Ok(match self.state() {
            LifecycleState::Started => HealthStatus::Healthy,
            LifecycleState::Created | LifecycleState::Starting => {
                HealthStatus::Degraded("output not started".into())
            }
            LifecycleState::Stopped => HealthStatus::Unhealthy("output stopped".into()),
        })
    }
}

#[async_trait]
impl<F: ExporterFactory> OutputAdapter for OtelOutput<F> {
    fn description(&self) -> &str {
        OUTPUT_NAME
    }

    async fn start(&self) -> Result<(), OteloutError> {
        {
            let mut state = self.write_state();
            if !matches!(*state, State::Created) {
                return Err(OteloutError::Lifecycle {
                    operation: "start",
                    state: state.lifecycle(),
                });
            }
            *state = State::Starting;
        }
        let guard = StartGuard::new(&self.state, self.sink.as_ref());

        self.echo_config();

        let config = Arc::clone(&self.config);
        let factory = Arc::clone(&self.factory);
        let built = tokio::task::spawn_blocking(move || {
            ExportPipeline::from_config(&config, factory.as_ref())
        })
        .await
        .map_err(join_error)
        .and_then(|result| result);

        match built {
            Ok(pipeline) => {
                guard.finish(State::Started(Arc::new(pipeline)));
                tracing::info!(meter = %self.config.meter.name, "otel output started");
                Ok(())
            }
            Err(err) => {
                guard.finish(State::Created);
                self.sink
                    .report(category_of(&err), &format!("observed error during start: {err}"));
                tracing::error!(error = %err, "otel output failed to start");
                Err(err)
            }
        }
    }

    fn add_samples(&self, containers: &[Box<dyn SampleContainer>]) {
        let Some(pipeline) = self.pipeline() else {
            let dropped: usize = containers.iter().map(|c| c.samples().len()).sum();
            tracing::warn!(dropped, state = %self.state(), "samples received outside started state");
            self.sink.report(
                DiagnosticCategory::Lifecycle,
                &format!(
                    "dropped {dropped} samples received while {}",
                    self.state()
                ),
            );
            return;
        };

        let mut outcome = TranslateOutcome::default();
        for container in containers {
            outcome.merge(
                self.translator
                    .translate(pipeline.registry(), container.samples()),
            );
        }
        tracing::trace!(
            recorded = outcome.recorded,
            ignored = outcome.ignored,
            "samples translated"
        );
        self.report_outcome(outcome);
    }

    async fn stop(&self) -> Result<(), OteloutError> {
        let pipeline = {
            let mut state = self.write_state();
            match std::mem::replace(&mut *state, State::Stopped) {
                State::Started(pipeline) => pipeline,
                other => {
                    let current = other.lifecycle();
                    *state = other;
                    return Err(OteloutError::Lifecycle {
                        operation: "stop",
                        state: current,
                    });
                }
            }
        };

        let timeout = self.config.shutdown.timeout();
        let result = match tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || pipeline.shutdown()),
        )
        .await
        {
            Ok(joined) => joined.map_err(join_error).and_then(|result| result),
            Err(_) => Err(OteloutError::Timeout { duration: timeout }),
        };

        match &result {
            Ok(()) => tracing::info!("otel output stopped"),
            Err(err) => {
                self.sink
                    .report(category_of(err), &format!("observed error during shutdown: {err}"));
                tracing::warn!(error = %err, "otel output stopped with error");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use otelout_core::{Sample, WriterSink};

    use super::*;

    #[test]
    fn errors_map_to_diagnostic_categories() {
        let resource = OteloutError::ResourceCreation {
            message: "x".into(),
            source: None,
        };
        assert_eq!(category_of(&resource), DiagnosticCategory::Resource);
        let timeout = OteloutError::Timeout {
            duration: std::time::Duration::from_secs(1),
        };
        assert_eq!(category_of(&timeout), DiagnosticCategory::Shutdown);
        let lifecycle = OteloutError::Lifecycle {
            operation: "stop",
            state: LifecycleState::Created,
        };
        assert_eq!(category_of(&lifecycle), DiagnosticCategory::Lifecycle);
    }

    #[test]
    fn samples_before_start_are_dropped_with_one_line() {
        let sink = Arc::new(WriterSink::new(Vec::new()));
        let output = OtelOutput::new(OteloutConfig::default(), sink.clone());
        let batch: Vec<Box<dyn SampleContainer>> = vec![
            Box::new(Sample::new("http_reqs", 1.0)),
            Box::new(Sample::new("http_req_duration", 3.0)),
        ];
        output.add_samples(&batch);

        drop(output);
        let sink = Arc::into_inner(sink).expect("sole owner");
        let written = String::from_utf8(sink.into_inner()).expect("utf8");
        assert_eq!(written, "lifecycle: dropped 2 samples received while created\n");
    }

    #[tokio::test]
    async fn identity_is_static_in_every_state() {
        let output = OtelOutput::new(OteloutConfig::default(), Arc::new(WriterSink::new(Vec::new())));
        assert_eq!(output.description(), "otelout");
        assert_eq!(output.name(), "otelout");
        assert_eq!(output.state(), LifecycleState::Created);
        assert!(matches!(
            output.health_check().await,
            Ok(HealthStatus::Degraded(_))
        ));
        assert!(output.registered_instruments().is_empty());
    }

    #[tokio::test]
    async fn flush_before_start_is_a_lifecycle_error() {
        let output = OtelOutput::new(OteloutConfig::default(), Arc::new(WriterSink::new(Vec::new())));
        assert!(matches!(
            output.flush().await,
            Err(OteloutError::Lifecycle {
                operation: "flush",
                ..
            })
        ));
    }
}
