/*!
 * Extraction of the translation object from raw oracle output.
 *
 * Models wrap their JSON in code fences, prepend chatter, or append notes.
 * `JsonResponseParser` digs the object out with two heuristics; anything it
 * cannot read is reported as `None` so the caller picks the fallback.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Fenced block explicitly labelled as JSON
static JSON_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").unwrap()
});

/// Turns raw oracle output into a `source -> translated` mapping
///
/// Implementations never fail loudly: unreadable input yields `None`.
pub trait ResponseParser: Send + Sync {
    /// Parse `raw`, or return `None` when no mapping can be recovered
    fn parse(&self, raw: &str) -> Option<HashMap<String, String>>;
}

/// Best-effort parser for free-form model replies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponseParser;

impl JsonResponseParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Interior of the first fenced block labelled `json`
    fn fenced_block(raw: &str) -> Option<&str> {
        JSON_FENCE_REGEX
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Substring from the first `{` to the last `}`, inclusive
    fn brace_span(raw: &str) -> Option<&str> {
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        if end > start {
            Some(&raw[start..=end])
        } else {
            None
        }
    }

    /// Decode a JSON object into string pairs
    fn decode_object(candidate: &str) -> Option<HashMap<String, String>> {
        let value: Value = serde_json::from_str(candidate.trim()).ok()?;
        let object = match value {
            Value::Object(object) => object,
            _ => return None,
        };

        let mapping = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, text)),
                Value::Number(number) => Some((key, number.to_string())),
                Value::Bool(flag) => Some((key, flag.to_string())),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            })
            .collect();

        Some(mapping)
    }
}

impl ResponseParser for JsonResponseParser {
    fn parse(&self, raw: &str) -> Option<HashMap<String, String>> {
        if let Some(mapping) = Self::fenced_block(raw).and_then(Self::decode_object) {
            return Some(mapping);
        }

        Self::brace_span(raw).and_then(Self::decode_object)
    }
}
