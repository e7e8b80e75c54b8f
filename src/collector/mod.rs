//! Call-log collector
//!
//! The collector is the black-box record an LLM runtime fills while a
//! wrapped function executes: one `FunctionLog` per logical call, each
//! holding the chronological HTTP attempts (retries appended after the
//! first try, never replacing it). The wrapper hands a fresh collector to
//! the function and drains it afterwards via [`extract_calls`].

pub mod extract;

pub use extract::{extract_calls, Attempt, LogicalCall};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wall-clock timing of a logged call or attempt
///
/// Millisecond epoch timestamps, matching what LLM runtimes record around
/// their network I/O.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Timing {
    /// Unix timestamp (milliseconds) when the operation started.
    pub start_utc_ms: i64,
    /// Duration in milliseconds; absent for operations cut short before
    /// completion was observed.
    pub duration_ms: Option<i64>,
}

impl Timing {
    pub fn new(start_utc_ms: i64, duration_ms: Option<i64>) -> Self {
        Self {
            start_utc_ms,
            duration_ms,
        }
    }

    /// Timing that starts now with no recorded duration yet.
    pub fn starting_now() -> Self {
        Self {
            start_utc_ms: Utc::now().timestamp_millis(),
            duration_ms: None,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.start_utc_ms).unwrap_or_default()
    }

    /// End time; a missing duration yields a zero-length window.
    pub fn ended_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.start_utc_ms + self.duration_ms.unwrap_or(0))
            .unwrap_or_default()
    }
}

/// One HTTP-level exchange recorded by the runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpAttemptRecord {
    /// Provider tag selecting the payload parser (e.g. `openai`).
    pub provider: String,
    /// Raw request body as sent.
    pub request_body: Value,
    /// Raw response body, absent if the attempt never completed.
    pub response_body: Option<Value>,
    /// HTTP status of the response, if one arrived.
    pub http_status: Option<u16>,
    pub timing: Timing,
}

/// One logical call a wrapped function made to the LLM runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionLog {
    /// Runtime-assigned call identifier.
    pub id: String,
    /// Name of the LLM function that was called.
    pub function_name: String,
    pub timing: Timing,
    /// HTTP attempts in chronological order; index 0 is the first try.
    pub attempts: Vec<HttpAttemptRecord>,
    /// Raw text of the selected LLM response, when the runtime kept it.
    pub raw_llm_response: Option<String>,
}

/// Black-box call log for one wrapped invocation
///
/// The runtime appends while the function runs; the wrapper reads a
/// snapshot afterwards. Appending and reading may happen from different
/// threads, hence the lock, but one collector belongs to exactly one
/// invocation and is never shared across them.
#[derive(Debug)]
pub struct Collector {
    name: String,
    logs: Mutex<Vec<FunctionLog>>,
}

impl Collector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logs: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a completed function log. Order of appends is the order the
    /// logical calls were issued.
    pub fn log_function(&self, log: FunctionLog) {
        tracing::debug!(
            collector = %self.name,
            function = %log.function_name,
            attempts = log.attempts.len(),
            "Recorded function log"
        );
        self.logs.lock().push(log);
    }

    /// Snapshot of all logs recorded so far, in append order.
    pub fn logs(&self) -> Vec<FunctionLog> {
        self.logs.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.lock().is_empty()
    }
}
