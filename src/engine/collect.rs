// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::engine::StreamContext;
use crate::errors::SinkError;
use crate::model::{MessageTuple, RawTuple, StreamItem};
use crate::traits::{BytesCollector, StatusCallback, TupleCollector};

/// The sink behind a node together with the collect strategy it implies.
#[derive(Clone)]
pub enum Collector {
    /// Delivers raw payloads; errors are sent as their text.
    Bytes(Arc<dyn BytesCollector>),
    /// Delivers structured messages; raw JSON payloads are decoded first.
    Tuple(Arc<dyn TupleCollector>),
}

impl Collector {
    pub fn strategy(&self) -> &'static str {
        match self {
            Collector::Bytes(_) => "bytes",
            Collector::Tuple(_) => "tuple",
        }
    }

    pub async fn connect(&self, ctx: &StreamContext, status: StatusCallback) -> Result<(), SinkError> {
        match self {
            Collector::Bytes(sink) => sink.connect(ctx, status).await,
            Collector::Tuple(sink) => sink.connect(ctx, status).await,
        }
    }

    pub async fn close(&self, ctx: &StreamContext) -> Result<(), SinkError> {
        match self {
            Collector::Bytes(sink) => sink.close(ctx).await,
            Collector::Tuple(sink) => sink.close(ctx).await,
        }
    }

    /// Hand one item to the sink. Returns the error that kept it from being
    /// delivered, including a type mismatch for payloads the strategy does not
    /// understand.
    pub async fn collect(&self, ctx: &StreamContext, item: &StreamItem) -> Result<(), SinkError> {
        match self {
            Collector::Bytes(sink) => bytes_collect(ctx, sink.as_ref(), item).await,
            Collector::Tuple(sink) => tuple_collect(ctx, sink.as_ref(), item).await,
        }
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Collector").field(&self.strategy()).finish()
    }
}

async fn bytes_collect(
    ctx: &StreamContext,
    sink: &dyn BytesCollector,
    item: &StreamItem,
) -> Result<(), SinkError> {
    match item {
        StreamItem::Raw(raw) => sink.collect(ctx, raw).await,
        StreamItem::Error(err) => sink.collect(ctx, &RawTuple::from_error(&err.to_string())).await,
        other => Err(SinkError::TypeMismatch {
            expected: "raw tuple",
            got: other.kind(),
        }),
    }
}

async fn tuple_collect(
    ctx: &StreamContext,
    sink: &dyn TupleCollector,
    item: &StreamItem,
) -> Result<(), SinkError> {
    match item {
        StreamItem::TupleList(list) => sink.collect_list(ctx, list).await,
        StreamItem::Tuple(tuple) => sink.collect(ctx, tuple).await,
        // raw payloads may come out of a data template
        StreamItem::Raw(raw) => {
            let tuple = MessageTuple::from_raw(raw)?;
            sink.collect(ctx, &tuple).await
        }
        StreamItem::Error(err) => sink.collect(ctx, &MessageTuple::from_error(&err.to_string())).await,
        other => Err(SinkError::TypeMismatch {
            expected: "tuple",
            got: other.kind(),
        }),
    }
}
