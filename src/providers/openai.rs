//! OpenAI-shaped chat payload parser
//!
//! Requests carry a `messages` array of `{role, content}` objects;
//! responses carry `choices` (the first element's `message` becomes the
//! assistant turn) and a `usage` object copied through verbatim.

use serde_json::Value;

use crate::error::ParseError;
use crate::types::{ChatMessage, Role, TokenUsage};

use super::ParsedExchange;

pub(super) fn parse(
    request: &Value,
    response: Option<&Value>,
) -> Result<ParsedExchange, ParseError> {
    let request_messages = request
        .get("messages")
        .and_then(|m| m.as_array())
        .ok_or(ParseError::MissingField("messages"))?;

    let mut messages: Vec<ChatMessage> =
        request_messages.iter().map(request_message).collect();

    let mut usage = None;
    if let Some(resp) = response {
        messages.push(response_message(resp));
        usage = resp.get("usage").and_then(parse_usage);
    }

    Ok(ParsedExchange { messages, usage })
}

/// Map one request-side message; a malformed entry degrades to an opaque
/// user message carrying the entry verbatim.
fn request_message(entry: &Value) -> ChatMessage {
    let role = match entry.get("role").and_then(|r| r.as_str()) {
        Some(role) => Role::from_wire(role),
        None => return ChatMessage::from_value(Role::User, entry.clone()),
    };
    let content = entry.get("content").cloned().unwrap_or(Value::Null);
    match content {
        Value::Null => ChatMessage::from_value(role, entry.clone()),
        other => ChatMessage::from_value(role, other),
    }
}

/// The first choice's message, appended as the assistant turn.
///
/// Text content becomes plain text; anything else (tool calls, refusals)
/// is carried as the full message object. A response without a usable
/// choice degrades to an opaque user message.
fn response_message(response: &Value) -> ChatMessage {
    let choice_message = response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"));

    match choice_message {
        Some(message) => match message.get("content").and_then(|c| c.as_str()) {
            Some(text) => ChatMessage::assistant(text),
            None => ChatMessage::from_value(Role::Assistant, message.clone()),
        },
        None => ChatMessage::from_value(Role::User, response.clone()),
    }
}

fn parse_usage(usage: &Value) -> Option<TokenUsage> {
    serde_json::from_value(usage.clone()).ok()
}
