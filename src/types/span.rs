//! Span descriptor types shared with trace backends

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RequestId, SpanId};

/// Kind of a span in the emitted tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Root span opened by a trace session.
    Root,
    /// One call to a wrapped LLM-backed function.
    Invocation,
    /// One semantic call the function made to the LLM runtime.
    LogicalCall,
    /// One HTTP-level exchange (initial try or retry).
    Attempt,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Root => "root",
            SpanKind::Invocation => "invocation",
            SpanKind::LogicalCall => "logical_call",
            SpanKind::Attempt => "attempt",
        }
    }
}

/// Final status of a closed span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    Ok,
    Error,
}

impl SpanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanStatus::Ok => "ok",
            SpanStatus::Error => "error",
        }
    }
}

/// Parameters for opening a span on the backend
#[derive(Debug, Clone)]
pub struct SpanStart<'a> {
    pub name: &'a str,
    pub kind: SpanKind,
    pub request_id: &'a RequestId,
    pub parent_id: Option<&'a SpanId>,
    pub started_at: DateTime<Utc>,
}

/// A complete span record as a backend stores it
///
/// Spans are addressed by id through the backend; the parent reference is
/// an identifier, never an ownership pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDescriptor {
    pub id: SpanId,
    pub name: String,
    pub kind: SpanKind,
    pub request_id: RequestId,
    pub parent_id: Option<SpanId>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub attributes: BTreeMap<String, Value>,
    pub status: Option<SpanStatus>,
}

impl SpanDescriptor {
    /// True once the span has been closed by the backend.
    pub fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
