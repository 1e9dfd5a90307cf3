// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::StreamContext;
use crate::errors::SinkError;
use crate::model::{MessageTuple, RawTuple};

/// Connection state reported by a sink through its status callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoked by a sink whenever its connection status changes, with a
/// human-readable detail message (possibly empty).
pub type StatusCallback = Arc<dyn Fn(ConnectionStatus, &str) + Send + Sync>;

/// Terminal destination of a rule.
///
/// The sink owns reconnection: a failed `connect` is reported but the node
/// keeps feeding it records.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn connect(&self, ctx: &StreamContext, status: StatusCallback) -> Result<(), SinkError>;

    async fn close(&self, ctx: &StreamContext) -> Result<(), SinkError>;
}

/// A sink that delivers already-encoded payloads.
#[async_trait]
pub trait BytesCollector: Sink {
    async fn collect(&self, ctx: &StreamContext, item: &RawTuple) -> Result<(), SinkError>;
}

/// A sink that delivers structured messages, one at a time or as a batch.
#[async_trait]
pub trait TupleCollector: Sink {
    async fn collect(&self, ctx: &StreamContext, item: &MessageTuple) -> Result<(), SinkError>;

    async fn collect_list(&self, ctx: &StreamContext, items: &[MessageTuple]) -> Result<(), SinkError>;
}
