// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use super::Value;

/// Field map of a structured message.
pub type Message = serde_json::Map<String, Value>;

/// Milliseconds since the Unix epoch, saturating at zero for clocks set
/// before 1970.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// An already-encoded payload, typically produced by a data template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTuple {
    pub raw: Vec<u8>,
    pub metadata: Message,
    pub props: HashMap<String, String>,
    pub timestamp: i64,
    pub emitter: String,
}

impl RawTuple {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            raw: raw.into(),
            timestamp: now_millis(),
            ..Default::default()
        }
    }

    /// Raw payload carrying the text of an upstream error.
    pub fn from_error(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

/// A structured record: a field map plus its provenance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageTuple {
    pub message: Message,
    pub metadata: Message,
    pub props: HashMap<String, String>,
    pub timestamp: i64,
    pub emitter: String,
}

impl MessageTuple {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            timestamp: now_millis(),
            ..Default::default()
        }
    }

    /// Wraps an upstream error's text as `{"error": text}`.
    pub fn from_error(text: &str) -> Self {
        let mut message = Message::new();
        message.insert("error".to_string(), Value::String(text.to_string()));
        Self::new(message)
    }

    /// Decodes a raw JSON object payload, keeping the raw tuple's provenance.
    pub fn from_raw(raw: &RawTuple) -> Result<Self, serde_json::Error> {
        let message: Message = serde_json::from_slice(&raw.raw)?;
        Ok(Self {
            message,
            metadata: raw.metadata.clone(),
            props: raw.props.clone(),
            timestamp: raw.timestamp,
            emitter: raw.emitter.clone(),
        })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.message.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_raw_decodes_object_and_keeps_provenance() {
        let mut raw = RawTuple::new(br#"{"temperature": 21.5, "device": "d1"}"#.to_vec());
        raw.emitter = "demo".to_string();
        raw.props.insert("topic".to_string(), "t/1".to_string());

        let tuple = MessageTuple::from_raw(&raw).unwrap();
        assert_eq!(tuple.get("temperature"), Some(&json!(21.5)));
        assert_eq!(tuple.emitter, "demo");
        assert_eq!(tuple.timestamp, raw.timestamp);
        assert_eq!(tuple.props.get("topic").map(String::as_str), Some("t/1"));
    }

    #[test]
    fn from_raw_rejects_non_object_payload() {
        let raw = RawTuple::new(b"[1, 2, 3]".to_vec());
        assert!(MessageTuple::from_raw(&raw).is_err());
    }

    #[test]
    fn from_error_wraps_text() {
        let tuple = MessageTuple::from_error("boom");
        assert_eq!(tuple.get("error"), Some(&json!("boom")));
    }
}
