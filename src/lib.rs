//! # BAML-Trace
//!
//! Bridge from a BAML-style LLM function runtime to a generic
//! distributed-tracing backend.
//!
//! A wrapped function runs against a fresh [`Collector`]; afterwards the
//! collector's call log is flattened into logical calls and HTTP attempts,
//! provider payloads are parsed into role-tagged chat messages, and the
//! whole invocation is emitted as a span tree: invocation span, one child
//! per logical call, one grandchild per attempt.
//!
//! ## Features
//!
//! - **Result passthrough**: the wrapped function's value or error is
//!   returned untouched; tracing can never mask it
//! - **Pluggable payload parsers**: OpenAI-shaped payloads parsed into
//!   chat messages, unknown providers degrade to opaque passthrough
//! - **Guarded sessions**: root spans close on every exit path, panics
//!   included
//! - **Backend isolation**: a failing tracing service degrades to warnings
//!
//! ## Quick Start
//!
//! ```rust
//! use baml_trace::{trace_baml_function, InMemoryBackend, TraceOptions};
//! use serde_json::json;
//!
//! let backend = InMemoryBackend::new();
//! let result: Result<Vec<String>, String> = trace_baml_function(
//!     &backend,
//!     "ListInventory",
//!     json!(["raw stock text"]),
//!     TraceOptions::new().with_experiment("inventory"),
//!     |_collector| Ok(vec!["Apples".to_string()]),
//! );
//! assert_eq!(result.unwrap(), vec!["Apples".to_string()]);
//! assert_eq!(backend.roots().len(), 1);
//! ```

pub mod backend;
pub mod collector;
pub mod config;
pub mod emitter;
pub mod error;
pub mod providers;
pub mod session;
pub mod types;
pub mod wrapper;

pub use backend::{InMemoryBackend, TraceBackend};
pub use collector::{extract_calls, Attempt, Collector, FunctionLog, HttpAttemptRecord, LogicalCall, Timing};
pub use config::TraceConfig;
pub use emitter::{Invocation, SpanEmitter};
pub use error::{BackendError, BackendResult, ParseError};
pub use session::{start_baml_trace, TraceSession, ROOT_SPAN_NAME};
pub use types::{
    ChatMessage, MessageContent, RequestId, Role, SpanDescriptor, SpanId, SpanKind, SpanStart,
    SpanStatus, TokenUsage,
};
pub use wrapper::{trace_baml_function, TraceOptions, DEFAULT_EXPERIMENT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
