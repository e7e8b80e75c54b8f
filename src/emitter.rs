//! Span emission
//!
//! Converts one extracted invocation into a tree of backend spans: the
//! invocation span, one child per logical call, one grandchild per HTTP
//! attempt. Backend failures are logged and swallowed here; tracing is a
//! side channel and must never disturb the wrapped call.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::backend::TraceBackend;
use crate::collector::LogicalCall;
use crate::config::TraceConfig;
use crate::types::{RequestId, SpanId, SpanKind, SpanStart, SpanStatus, TokenUsage};

/// One completed call to a wrapped LLM-backed function
#[derive(Debug, Clone)]
pub struct Invocation {
    pub function_name: String,
    /// Serialized arguments the function was called with.
    pub input: Value,
    /// Serialized return value; absent when the function failed.
    pub output: Option<Value>,
    /// Error description when the function failed.
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub calls: Vec<LogicalCall>,
}

/// Emits span trees for invocations under one request identifier
pub struct SpanEmitter<'a> {
    backend: &'a dyn TraceBackend,
    config: &'a TraceConfig,
    request_id: &'a RequestId,
}

impl<'a> SpanEmitter<'a> {
    pub fn new(
        backend: &'a dyn TraceBackend,
        config: &'a TraceConfig,
        request_id: &'a RequestId,
    ) -> Self {
        Self {
            backend,
            config,
            request_id,
        }
    }

    /// Emit the full span tree for one invocation.
    ///
    /// Returns the invocation span id when the backend accepted it, so a
    /// caller may nest further children under it explicitly.
    pub fn emit_invocation(
        &self,
        invocation: &Invocation,
        parent_id: Option<&SpanId>,
    ) -> Option<SpanId> {
        let started_at = invocation.started_at;
        let ended_at = invocation.ended_at.max(started_at);

        let invocation_id = self.try_start(
            &invocation.function_name,
            SpanKind::Invocation,
            parent_id,
            started_at,
        )?;

        self.try_set(&invocation_id, "function.input", invocation.input.clone());
        if let Some(output) = &invocation.output {
            self.try_set(&invocation_id, "function.output", output.clone());
        }
        self.try_set(
            &invocation_id,
            "duration_ms",
            json!((ended_at - started_at).num_milliseconds()),
        );

        for call in &invocation.calls {
            self.emit_call(call, &invocation_id, started_at, ended_at);
        }

        let status = if invocation.error.is_some() {
            SpanStatus::Error
        } else {
            SpanStatus::Ok
        };
        if let Some(error) = &invocation.error {
            self.try_set(&invocation_id, "error.description", json!(error));
        }
        self.try_end(&invocation_id, ended_at, status);

        Some(invocation_id)
    }

    fn emit_call(
        &self,
        call: &LogicalCall,
        invocation_id: &SpanId,
        parent_start: DateTime<Utc>,
        parent_end: DateTime<Utc>,
    ) {
        let (started_at, ended_at) =
            clamp_window(call.started_at, call.ended_at, parent_start, parent_end);

        let Some(call_id) =
            self.try_start(&call.name, SpanKind::LogicalCall, Some(invocation_id), started_at)
        else {
            return;
        };

        self.try_set(&call_id, "call.id", json!(call.id));
        if let Some(usage) = &call.usage {
            self.set_usage(&call_id, usage);
        }
        if let Some(raw) = &call.raw_response {
            self.try_set(&call_id, "llm.raw_response", self.clip(json!(raw)));
        }

        for attempt in &call.attempts {
            self.emit_attempt(attempt, &call_id, started_at, ended_at);
        }

        self.try_end(&call_id, ended_at, SpanStatus::Ok);
    }

    fn emit_attempt(
        &self,
        attempt: &crate::collector::Attempt,
        call_id: &SpanId,
        parent_start: DateTime<Utc>,
        parent_end: DateTime<Utc>,
    ) {
        let (started_at, ended_at) =
            clamp_window(attempt.started_at, attempt.ended_at, parent_start, parent_end);

        // Span names use the 1-based position among the call's attempts.
        let name = format!("LLMCall_{}_{}", attempt.provider, attempt.index + 1);
        let Some(attempt_id) =
            self.try_start(&name, SpanKind::Attempt, Some(call_id), started_at)
        else {
            return;
        };

        if let Some(status) = attempt.http_status {
            self.try_set(&attempt_id, "http.status", json!(status));
        }
        if self.config.record_raw_bodies {
            self.try_set(
                &attempt_id,
                "request.body",
                self.clip(attempt.request_body.clone()),
            );
            if let Some(body) = &attempt.response_body {
                self.try_set(&attempt_id, "response.body", self.clip(body.clone()));
            }
        }
        if self.config.record_chat_messages {
            match serde_json::to_value(&attempt.messages) {
                Ok(messages) => self.try_set(&attempt_id, "chat.messages", messages),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize chat messages")
                }
            }
        }
        if let Some(usage) = &attempt.usage {
            self.set_usage(&attempt_id, usage);
        }

        self.try_end(&attempt_id, ended_at, SpanStatus::Ok);
    }

    fn set_usage(&self, id: &SpanId, usage: &TokenUsage) {
        self.try_set(id, "usage.prompt_tokens", json!(usage.prompt_tokens));
        self.try_set(id, "usage.completion_tokens", json!(usage.completion_tokens));
        self.try_set(id, "usage.total_tokens", json!(usage.total_tokens));
    }

    fn try_start(
        &self,
        name: &str,
        kind: SpanKind,
        parent_id: Option<&SpanId>,
        started_at: DateTime<Utc>,
    ) -> Option<SpanId> {
        match self.backend.start_span(SpanStart {
            name,
            kind,
            request_id: self.request_id,
            parent_id,
            started_at,
        }) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(span = name, error = %e, "Failed to start span");
                None
            }
        }
    }

    fn try_set(&self, id: &SpanId, key: &str, value: Value) {
        if let Err(e) = self.backend.set_attribute(id, key, value) {
            tracing::warn!(span = %id, key = key, error = %e, "Failed to set span attribute");
        }
    }

    fn try_end(&self, id: &SpanId, ended_at: DateTime<Utc>, status: SpanStatus) {
        if let Err(e) = self.backend.end_span(id, ended_at, status) {
            tracing::warn!(span = %id, error = %e, "Failed to end span");
        }
    }

    /// Truncate oversized string values to keep the backend healthy.
    fn clip(&self, value: Value) -> Value {
        let max = self.config.max_payload_len;
        match value {
            Value::String(s) if s.len() > max => Value::String(truncate_utf8(&s, max)),
            Value::String(s) => Value::String(s),
            other => {
                let rendered = other.to_string();
                if rendered.len() > max {
                    Value::String(truncate_utf8(&rendered, max))
                } else {
                    other
                }
            }
        }
    }
}

/// Clamp a child window into its parent's, keeping end >= start.
///
/// Collector timestamps can be skewed across retries; an invalid span is
/// worse than a clamped one.
fn clamp_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    parent_start: DateTime<Utc>,
    parent_end: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start.clamp(parent_start, parent_end);
    let end = end.clamp(start, parent_end);
    (start, end)
}

/// Truncate a string to at most `max` bytes on a UTF-8 char boundary.
fn truncate_utf8(s: &str, max: usize) -> String {
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::collector::{extract_calls, Collector, FunctionLog, HttpAttemptRecord, Timing};
    use chrono::TimeZone;

    fn invocation_with(calls: Vec<LogicalCall>, error: Option<String>) -> Invocation {
        Invocation {
            function_name: "ListInventory".into(),
            input: json!(["stock text"]),
            output: error.is_none().then(|| json!([{"item": "Apples"}])),
            error,
            started_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            ended_at: Utc.timestamp_millis_opt(1_700_000_001_000).unwrap(),
            calls,
        }
    }

    fn calls_with_attempts(attempt_starts: &[i64]) -> Vec<LogicalCall> {
        let collector = Collector::new("test");
        collector.log_function(FunctionLog {
            id: "log-1".into(),
            function_name: "ListInventory".into(),
            timing: Timing::new(1_700_000_000_000, Some(900)),
            attempts: attempt_starts
                .iter()
                .map(|start| HttpAttemptRecord {
                    provider: "openai".into(),
                    request_body: json!({"messages": [{"role": "user", "content": "hi"}]}),
                    response_body: None,
                    http_status: Some(200),
                    timing: Timing::new(*start, Some(50)),
                })
                .collect(),
            raw_llm_response: None,
        });
        extract_calls(&collector)
    }

    #[test]
    fn test_emits_three_level_hierarchy() {
        let backend = InMemoryBackend::new();
        let config = TraceConfig::default();
        let request_id = RequestId::new();
        let emitter = SpanEmitter::new(&backend, &config, &request_id);

        let invocation =
            invocation_with(calls_with_attempts(&[1_700_000_000_100, 1_700_000_000_300]), None);
        let invocation_id = emitter.emit_invocation(&invocation, None).unwrap();

        let children = backend.children_of(&invocation_id);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind, SpanKind::LogicalCall);

        let attempts = backend.children_of(&children[0].id);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].name, "LLMCall_openai_1");
        assert_eq!(attempts[1].name, "LLMCall_openai_2");
        for span in backend.spans() {
            assert!(span.is_closed());
            assert_eq!(span.request_id, request_id);
        }
    }

    #[test]
    fn test_child_windows_stay_inside_parent() {
        let backend = InMemoryBackend::new();
        let config = TraceConfig::default();
        let request_id = RequestId::new();
        let emitter = SpanEmitter::new(&backend, &config, &request_id);

        // Second attempt starts before the call window due to clock skew.
        let invocation =
            invocation_with(calls_with_attempts(&[1_700_000_000_100, 1_699_999_999_000]), None);
        let invocation_id = emitter.emit_invocation(&invocation, None).unwrap();

        let invocation_span = backend.span(&invocation_id).unwrap();
        for child in backend.children_of(&invocation_id) {
            assert!(child.started_at >= invocation_span.started_at);
            assert!(child.ended_at.unwrap() <= invocation_span.ended_at.unwrap());
            for attempt in backend.children_of(&child.id) {
                assert!(attempt.started_at >= child.started_at);
                assert!(attempt.ended_at.unwrap() <= child.ended_at.unwrap());
                assert!(attempt.ended_at.unwrap() >= attempt.started_at);
            }
        }
    }

    #[test]
    fn test_error_invocation_closed_with_error_status() {
        let backend = InMemoryBackend::new();
        let config = TraceConfig::default();
        let request_id = RequestId::new();
        let emitter = SpanEmitter::new(&backend, &config, &request_id);

        let invocation = invocation_with(vec![], Some("boom".into()));
        let invocation_id = emitter.emit_invocation(&invocation, None).unwrap();

        let span = backend.span(&invocation_id).unwrap();
        assert!(span.is_closed());
        assert_eq!(span.status, Some(SpanStatus::Error));
        assert_eq!(span.attribute("error.description"), Some(&json!("boom")));
    }

    #[test]
    fn test_raw_bodies_respect_config_and_truncation() {
        let backend = InMemoryBackend::new();
        let config = TraceConfig::default().with_max_payload_len(32);
        let request_id = RequestId::new();
        let emitter = SpanEmitter::new(&backend, &config, &request_id);

        let collector = Collector::new("big");
        collector.log_function(FunctionLog {
            id: "log-1".into(),
            function_name: "ListInventory".into(),
            timing: Timing::new(1_700_000_000_000, Some(900)),
            attempts: vec![HttpAttemptRecord {
                provider: "openai".into(),
                request_body: json!({"messages": [{"role": "user", "content": "x".repeat(200)}]}),
                response_body: None,
                http_status: Some(200),
                timing: Timing::new(1_700_000_000_100, Some(50)),
            }],
            raw_llm_response: None,
        });
        let invocation = invocation_with(extract_calls(&collector), None);
        let invocation_id = emitter.emit_invocation(&invocation, None).unwrap();

        let call = &backend.children_of(&invocation_id)[0];
        let attempt = &backend.children_of(&call.id)[0];
        let body = attempt.attribute("request.body").unwrap();
        assert!(body.as_str().unwrap().len() <= 32);
    }

    #[test]
    fn test_zero_attempt_call_emits_degenerate_span() {
        let backend = InMemoryBackend::new();
        let config = TraceConfig::default();
        let request_id = RequestId::new();
        let emitter = SpanEmitter::new(&backend, &config, &request_id);

        let collector = Collector::new("aborted");
        collector.log_function(FunctionLog {
            id: "log-1".into(),
            function_name: "ListInventory".into(),
            timing: Timing::new(1_700_000_000_500, None),
            attempts: vec![],
            raw_llm_response: None,
        });
        let invocation = invocation_with(extract_calls(&collector), None);
        let invocation_id = emitter.emit_invocation(&invocation, None).unwrap();

        let children = backend.children_of(&invocation_id);
        assert_eq!(children.len(), 1);
        assert!(backend.children_of(&children[0].id).is_empty());
        assert_eq!(children[0].started_at, children[0].ended_at.unwrap());
    }
}
