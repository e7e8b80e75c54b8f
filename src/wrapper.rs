//! Traced function wrapper
//!
//! [`trace_baml_function`] runs an LLM-backed function with a fresh
//! collector, then turns everything the collector recorded into spans.
//! The wrapped function's result passes through untouched; tracing work
//! happens only after the function has returned and can never mask its
//! value or error.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::backend::TraceBackend;
use crate::collector::{extract_calls, Collector};
use crate::config::TraceConfig;
use crate::emitter::{Invocation, SpanEmitter};
use crate::session::TraceSession;
use crate::types::{RequestId, SpanId};

/// Experiment used when a traced call opens its own session.
pub const DEFAULT_EXPERIMENT: &str = "baml";

/// Placement and recording options for one traced call
#[derive(Debug, Clone, Default)]
pub struct TraceOptions {
    /// Session to group the invocation under; a fresh one-shot session is
    /// opened when absent.
    pub request_id: Option<RequestId>,
    /// Span to nest the invocation under; absent means top of its session.
    pub parent_id: Option<SpanId>,
    /// Experiment for a one-shot session; ignored when `request_id` is set.
    pub experiment: Option<String>,
    pub config: TraceConfig,
}

impl TraceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options placing the invocation under an open session's root span.
    pub fn in_session(session: &TraceSession<'_>) -> Self {
        Self {
            request_id: Some(session.request_id().clone()),
            parent_id: Some(session.root_span_id().clone()),
            experiment: None,
            config: session.config().clone(),
        }
    }

    pub fn with_experiment(mut self, experiment: impl Into<String>) -> Self {
        self.experiment = Some(experiment.into());
        self
    }

    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }
}

/// Run `func` with a fresh collector and trace what it did.
///
/// Returns exactly what `func` returned. A failing backend degrades to
/// warnings; a failing `func` still gets its invocation span, closed with
/// error status and the rendered error attached.
///
/// Spans are emitted only after `func` returns, so a panicking function
/// leaves no dangling invocation span (a surrounding session still closes
/// its root via its guard).
pub fn trace_baml_function<T, E, F>(
    backend: &dyn TraceBackend,
    function_name: &str,
    input: Value,
    options: TraceOptions,
    func: F,
) -> Result<T, E>
where
    T: Serialize,
    E: fmt::Display,
    F: FnOnce(&Collector) -> Result<T, E>,
{
    let Some(request_id) = options.request_id.clone() else {
        // No session given: open a one-shot session around the call.
        let experiment = options
            .experiment
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPERIMENT.to_string());
        let session = TraceSession::start(backend, &experiment, options.config.clone());
        let scoped = TraceOptions {
            request_id: Some(session.request_id().clone()),
            parent_id: Some(session.root_span_id().clone()),
            ..options
        };
        let result = trace_baml_function(backend, function_name, input, scoped, func);
        if result.is_ok() {
            session.finish();
        } else {
            session.finish_with_error();
        }
        return result;
    };

    let collector = Collector::new(function_name);
    let started_at = Utc::now();
    let result = func(&collector);
    let ended_at = Utc::now();

    let (output, error) = match &result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(rendered) => (Some(rendered), None),
            Err(e) => {
                tracing::warn!(function = function_name, error = %e, "Output not serializable");
                (None, None)
            }
        },
        Err(e) => (None, Some(e.to_string())),
    };

    let invocation = Invocation {
        function_name: function_name.to_string(),
        input,
        output,
        error,
        started_at,
        ended_at,
        calls: extract_calls(&collector),
    };

    SpanEmitter::new(backend, &options.config, &request_id)
        .emit_invocation(&invocation, options.parent_id.as_ref());

    result
}
