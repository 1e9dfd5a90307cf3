// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::sync::Arc;

use super::{MessageTuple, RawTuple, Value};

/// Event-time progress marker; sinks never deliver these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkTuple {
    pub timestamp: i64,
}

/// Everything an upstream operator can hand to a sink node.
///
/// Collect strategies dispatch on the variant; control markers (watermark,
/// batch EOF, EOF) are consumed by the node before collection.
#[derive(Debug, Clone)]
pub enum StreamItem {
    Raw(RawTuple),
    Tuple(MessageTuple),
    TupleList(Vec<MessageTuple>),
    Error(Arc<dyn Error + Send + Sync>),
    Watermark(WatermarkTuple),
    BatchEof,
    /// Completion of one upstream input, named by its source.
    Eof(String),
    /// A payload of no recognised shape.
    Unknown(Value),
}

impl StreamItem {
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        StreamItem::Error(Arc::new(err))
    }

    /// Display name of the variant, used in type-mismatch errors.
    pub fn kind(&self) -> String {
        match self {
            StreamItem::Raw(_) => "raw tuple".to_string(),
            StreamItem::Tuple(_) => "tuple".to_string(),
            StreamItem::TupleList(_) => "tuple list".to_string(),
            StreamItem::Error(_) => "error".to_string(),
            StreamItem::Watermark(_) => "watermark".to_string(),
            StreamItem::BatchEof => "batch eof".to_string(),
            StreamItem::Eof(_) => "eof".to_string(),
            StreamItem::Unknown(value) => format!("unknown({})", json_type(value)),
        }
    }

    /// Short identifier for log lines about a specific record.
    pub fn id(&self) -> String {
        match self {
            StreamItem::Raw(t) => format!("{}@{}", t.emitter, t.timestamp),
            StreamItem::Tuple(t) => format!("{}@{}", t.emitter, t.timestamp),
            StreamItem::TupleList(list) => format!("list[{}]", list.len()),
            other => other.kind(),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
