//! Provider payload parsers
//!
//! Each parser is a pure function of (request body, response body). The
//! dispatch table maps a provider tag to its parser; unknown tags and
//! malformed payloads degrade to an opaque passthrough so a foreign wire
//! format can never fail a trace.

mod openai;

use serde_json::Value;

use crate::error::ParseError;
use crate::types::{ChatMessage, Role, TokenUsage};

/// Result of parsing one HTTP exchange
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedExchange {
    /// Role-tagged messages in conversation order.
    pub messages: Vec<ChatMessage>,
    /// Usage counters copied from the response, when present.
    pub usage: Option<TokenUsage>,
}

type ParserFn = fn(&Value, Option<&Value>) -> Result<ParsedExchange, ParseError>;

/// Parsers in provider-tag order; first matching tag wins.
const PARSERS: &[(&str, ParserFn)] = &[
    ("openai", openai::parse),
    ("openai-generic", openai::parse),
    ("azure-openai", openai::parse),
];

/// Parse one raw HTTP exchange for the given provider tag.
///
/// Pure with respect to its inputs: calling twice with identical
/// arguments yields identical output, and the bodies are never mutated.
pub fn parse(provider: &str, request: &Value, response: Option<&Value>) -> ParsedExchange {
    let tag = provider.to_lowercase();
    for (name, parser) in PARSERS {
        if *name == tag {
            return match parser(request, response) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::debug!(
                        provider = %provider,
                        error = %e,
                        "Payload parse failed, using opaque passthrough"
                    );
                    opaque(request, response)
                }
            };
        }
    }

    tracing::debug!(provider = %provider, "Unknown provider tag, using opaque passthrough");
    opaque(request, response)
}

/// Fallback: carry each raw body as a single opaque user message.
fn opaque(request: &Value, response: Option<&Value>) -> ParsedExchange {
    let mut messages = vec![ChatMessage::from_value(Role::User, request.clone())];
    if let Some(resp) = response {
        messages.push(ChatMessage::from_value(Role::User, resp.clone()));
    }
    ParsedExchange {
        messages,
        usage: None,
    }
}
