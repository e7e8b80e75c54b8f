//! Trace backend seam
//!
//! The backend owns trace storage and the real span tree; this crate only
//! addresses spans by identifier through it. Implementations must be
//! thread-safe if invocations are traced from multiple threads.

pub mod memory;

pub use memory::InMemoryBackend;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::BackendResult;
use crate::types::{SpanId, SpanStart, SpanStatus};

/// Client surface of a distributed-tracing backend
pub trait TraceBackend: Send + Sync {
    /// Ensure the named experiment exists. Idempotent: an existing
    /// experiment is reused, never an error.
    fn ensure_experiment(&self, name: &str) -> BackendResult<()>;

    /// Open a span and return its backend-assigned identifier.
    fn start_span(&self, span: SpanStart<'_>) -> BackendResult<SpanId>;

    /// Close a span with the given end time and status.
    fn end_span(
        &self,
        id: &SpanId,
        ended_at: DateTime<Utc>,
        status: SpanStatus,
    ) -> BackendResult<()>;

    /// Attach an attribute to an open or closed span.
    fn set_attribute(&self, id: &SpanId, key: &str, value: Value) -> BackendResult<()>;
}
