//! Call-log extraction
//!
//! Flattens a collector into the ordered `LogicalCall`/`Attempt` shape the
//! span emitter consumes, running the provider payload parser over each
//! attempt on the way. Extraction preserves what the runtime observed:
//! out-of-order timestamps are kept here and only clamped at emission.

use chrono::{DateTime, Utc};

use crate::providers;
use crate::types::{ChatMessage, TokenUsage};

use super::{Collector, FunctionLog, HttpAttemptRecord};

/// One HTTP exchange after extraction and payload parsing
///
/// Immutable once extracted.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// Zero-based position among the attempts of its call.
    pub index: usize,
    pub provider: String,
    pub request_body: serde_json::Value,
    pub response_body: Option<serde_json::Value>,
    pub http_status: Option<u16>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Normalized chat messages parsed from the raw bodies.
    pub messages: Vec<ChatMessage>,
    pub usage: Option<TokenUsage>,
}

/// One logical call after extraction
#[derive(Debug, Clone)]
pub struct LogicalCall {
    pub id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Attempts in retry order; may be empty for a call aborted before
    /// any network I/O.
    pub attempts: Vec<Attempt>,
    /// Usage summed across attempts; absent when no attempt carried any.
    pub usage: Option<TokenUsage>,
    pub raw_response: Option<String>,
}

/// Flatten a collector into ordered logical calls.
///
/// An empty collector yields an empty list; a function that made no LLM
/// calls is not an error.
pub fn extract_calls(collector: &Collector) -> Vec<LogicalCall> {
    let logs = collector.logs();
    if logs.is_empty() {
        tracing::debug!(collector = %collector.name(), "No LLM calls recorded");
        return Vec::new();
    }
    logs.iter().map(extract_call).collect()
}

fn extract_call(log: &FunctionLog) -> LogicalCall {
    let attempts: Vec<Attempt> = log
        .attempts
        .iter()
        .enumerate()
        .map(|(index, record)| extract_attempt(index, record))
        .collect();

    let mut usage: Option<TokenUsage> = None;
    for attempt in &attempts {
        if let Some(attempt_usage) = &attempt.usage {
            usage
                .get_or_insert_with(TokenUsage::default)
                .accumulate(attempt_usage);
        }
    }

    LogicalCall {
        id: log.id.clone(),
        name: log.function_name.clone(),
        started_at: log.timing.started_at(),
        ended_at: log.timing.ended_at(),
        attempts,
        usage,
        raw_response: log.raw_llm_response.clone(),
    }
}

fn extract_attempt(index: usize, record: &HttpAttemptRecord) -> Attempt {
    let parsed = providers::parse(
        &record.provider,
        &record.request_body,
        record.response_body.as_ref(),
    );

    Attempt {
        index,
        provider: record.provider.clone(),
        request_body: record.request_body.clone(),
        response_body: record.response_body.clone(),
        http_status: record.http_status,
        started_at: record.timing.started_at(),
        ended_at: record.timing.ended_at(),
        messages: parsed.messages,
        usage: parsed.usage,
    }
}
