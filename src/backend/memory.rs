//! In-memory trace backend
//!
//! Stores every span in process memory with query helpers, so the crate
//! is usable and testable without a live tracing service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{BackendError, BackendResult};
use crate::types::{SpanDescriptor, SpanId, SpanStart, SpanStatus};

use super::TraceBackend;

/// Trace backend keeping all spans in memory
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    experiments: Mutex<Vec<String>>,
    spans: Mutex<Vec<SpanDescriptor>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all spans in creation order.
    pub fn spans(&self) -> Vec<SpanDescriptor> {
        self.spans.lock().clone()
    }

    /// Look up a single span by id.
    pub fn span(&self, id: &SpanId) -> Option<SpanDescriptor> {
        self.spans.lock().iter().find(|s| &s.id == id).cloned()
    }

    /// Direct children of the given span, in creation order.
    pub fn children_of(&self, id: &SpanId) -> Vec<SpanDescriptor> {
        self.spans
            .lock()
            .iter()
            .filter(|s| s.parent_id.as_ref() == Some(id))
            .cloned()
            .collect()
    }

    /// Spans with no parent, in creation order.
    pub fn roots(&self) -> Vec<SpanDescriptor> {
        self.spans
            .lock()
            .iter()
            .filter(|s| s.parent_id.is_none())
            .cloned()
            .collect()
    }

    /// Names of experiments that have been ensured, in first-seen order.
    pub fn experiments(&self) -> Vec<String> {
        self.experiments.lock().clone()
    }
}

impl TraceBackend for InMemoryBackend {
    fn ensure_experiment(&self, name: &str) -> BackendResult<()> {
        let mut experiments = self.experiments.lock();
        if !experiments.iter().any(|e| e == name) {
            experiments.push(name.to_string());
        }
        Ok(())
    }

    fn start_span(&self, span: SpanStart<'_>) -> BackendResult<SpanId> {
        let id = SpanId::new();
        self.spans.lock().push(SpanDescriptor {
            id: id.clone(),
            name: span.name.to_string(),
            kind: span.kind,
            request_id: span.request_id.clone(),
            parent_id: span.parent_id.cloned(),
            started_at: span.started_at,
            ended_at: None,
            attributes: BTreeMap::new(),
            status: None,
        });
        Ok(id)
    }

    fn end_span(
        &self,
        id: &SpanId,
        ended_at: DateTime<Utc>,
        status: SpanStatus,
    ) -> BackendResult<()> {
        let mut spans = self.spans.lock();
        let span = spans
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| BackendError::SpanNotFound(id.to_string()))?;
        span.ended_at = Some(ended_at);
        span.status = Some(status);
        Ok(())
    }

    fn set_attribute(&self, id: &SpanId, key: &str, value: Value) -> BackendResult<()> {
        let mut spans = self.spans.lock();
        let span = spans
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| BackendError::SpanNotFound(id.to_string()))?;
        span.attributes.insert(key.to_string(), value);
        Ok(())
    }
}
