//! Trace sessions
//!
//! A session owns the root span one or more traced invocations hang from.
//! It is a guard: however the scope exits, normally, early, or by panic,
//! the root span gets closed. Backend failures are logged and swallowed so
//! a broken tracing service never takes the workload down with it.

use chrono::Utc;

use crate::backend::TraceBackend;
use crate::config::TraceConfig;
use crate::types::{RequestId, SpanId, SpanKind, SpanStart, SpanStatus};

/// Name of every session root span.
pub const ROOT_SPAN_NAME: &str = "baml_multi_workflow";

/// Guard for one tracing session
///
/// Created by [`TraceSession::start`] or the scoped [`start_baml_trace`].
/// Dropping an unfinished session closes the root span, with error status
/// when the thread is unwinding.
pub struct TraceSession<'a> {
    backend: &'a dyn TraceBackend,
    config: TraceConfig,
    request_id: RequestId,
    root_span_id: SpanId,
    finished: bool,
}

impl<'a> TraceSession<'a> {
    /// Start a session: ensure the experiment exists and open the root
    /// span. Never fails; if the backend rejects the root span a local
    /// identifier is minted so invocations can still be grouped under it.
    pub fn start(backend: &'a dyn TraceBackend, experiment: &str, config: TraceConfig) -> Self {
        if let Err(e) = backend.ensure_experiment(experiment) {
            tracing::warn!(experiment = experiment, error = %e, "Failed to ensure experiment");
        }

        let request_id = RequestId::new();
        let root_span_id = match backend.start_span(SpanStart {
            name: ROOT_SPAN_NAME,
            kind: SpanKind::Root,
            request_id: &request_id,
            parent_id: None,
            started_at: Utc::now(),
        }) {
            Ok(id) => {
                if let Err(e) =
                    backend.set_attribute(&id, "experiment", serde_json::json!(experiment))
                {
                    tracing::warn!(span = %id, error = %e, "Failed to tag root span");
                }
                id
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start root span, using local id");
                SpanId::new()
            }
        };

        tracing::debug!(
            request_id = %request_id,
            root_span = %root_span_id,
            "Started trace session"
        );

        Self {
            backend,
            config,
            request_id,
            root_span_id,
            finished: false,
        }
    }

    /// Identifier grouping all spans of this session.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Root span invocations should use as their parent.
    pub fn root_span_id(&self) -> &SpanId {
        &self.root_span_id
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn backend(&self) -> &'a dyn TraceBackend {
        self.backend
    }

    /// Close the root span with ok status.
    pub fn finish(mut self) {
        self.close(SpanStatus::Ok);
    }

    /// Close the root span with error status.
    pub fn finish_with_error(mut self) {
        self.close(SpanStatus::Error);
    }

    fn close(&mut self, status: SpanStatus) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.backend.end_span(&self.root_span_id, Utc::now(), status) {
            tracing::warn!(span = %self.root_span_id, error = %e, "Failed to close root span");
        }
    }
}

impl Drop for TraceSession<'_> {
    fn drop(&mut self) {
        let status = if std::thread::panicking() {
            SpanStatus::Error
        } else {
            SpanStatus::Ok
        };
        self.close(status);
    }
}

/// Run a closure inside a fresh trace session.
///
/// The session is passed to the closure and closed afterwards, including
/// when the closure panics.
pub fn start_baml_trace<R>(
    backend: &dyn TraceBackend,
    experiment: &str,
    config: TraceConfig,
    f: impl FnOnce(&TraceSession<'_>) -> R,
) -> R {
    let session = TraceSession::start(backend, experiment, config);
    let result = f(&session);
    session.finish();
    result
}
