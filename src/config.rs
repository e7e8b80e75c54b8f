//! Tracing configuration
//!
//! Controls what gets attached to emitted spans and how large a single
//! attribute value may grow. Payload bodies can be arbitrarily big; the
//! truncation limit keeps the trace backend healthy without dropping the
//! exchange entirely.

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024;

/// Configuration for span emission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Attach raw HTTP request/response bodies to attempt spans.
    #[serde(default = "default_true")]
    pub record_raw_bodies: bool,
    /// Attach the parsed chat message list to attempt spans.
    #[serde(default = "default_true")]
    pub record_chat_messages: bool,
    /// Maximum byte length of a single string attribute value.
    #[serde(default = "default_max_payload_len")]
    pub max_payload_len: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_payload_len() -> usize {
    DEFAULT_MAX_PAYLOAD_LEN
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            record_raw_bodies: true,
            record_chat_messages: true,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw_bodies(mut self, enabled: bool) -> Self {
        self.record_raw_bodies = enabled;
        self
    }

    pub fn with_chat_messages(mut self, enabled: bool) -> Self {
        self.record_chat_messages = enabled;
        self
    }

    pub fn with_max_payload_len(mut self, len: usize) -> Self {
        self.max_payload_len = len;
        self
    }
}
