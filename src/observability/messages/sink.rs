// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for sink node lifecycle and delivery events.
//!
//! This module contains message types for logging events related to:
//! * Sink node construction and effective buffering settings
//! * Connection status changes reported by the sink
//! * Per-record delivery, drop, resend and retry outcomes
//! * End of stream and shutdown

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Sink node created with its resolved buffering settings.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use edgeflow::observability::messages::sink::SinkNodeCreated;
/// use std::time::Duration;
///
/// let msg = SinkNodeCreated {
///     node: "mqtt_sink",
///     strategy: "tuple",
///     is_retry: false,
///     resend_interval: Duration::from_millis(100),
///     buffer_length: 1024,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SinkNodeCreated<'a> {
    pub node: &'a str,
    pub strategy: &'a str,
    pub is_retry: bool,
    pub resend_interval: Duration,
    pub buffer_length: usize,
}

impl Display for SinkNodeCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "create {} sink node {} with isRetry {}, resendInterval {:?}, bufferLength {}",
            self.strategy, self.node, self.is_retry, self.resend_interval, self.buffer_length
        )
    }
}

impl StructuredLog for SinkNodeCreated<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            strategy = self.strategy,
            is_retry = self.is_retry,
            resend_interval_ms = self.resend_interval.as_millis() as u64,
            buffer_length = self.buffer_length,
            "{}", self
        );
    }
}

/// A record arrived on the node's input buffer.
///
/// # Log Level
/// `debug!` - Per-record tracing
pub struct RecordReceived<'a> {
    pub op_id: &'a str,
    pub instance_id: usize,
    pub kind: &'a str,
}

impl Display for RecordReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}_{} receive {}", self.op_id, self.instance_id, self.kind)
    }
}

impl StructuredLog for RecordReceived<'_> {
    fn log(&self) {
        tracing::debug!(
            op_id = self.op_id,
            instance_id = self.instance_id,
            kind = self.kind,
            "{}", self
        );
    }
}

/// Collection into the sink failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CollectFailed<'a> {
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CollectFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "sink {} failed: {}", self.node, self.error)
    }
}

impl StructuredLog for CollectFailed<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, error = %self.error, "{}", self);
    }
}

/// Record delivered.
///
/// # Log Level
/// `debug!` - Per-record tracing
pub struct RecordSent<'a> {
    pub node: &'a str,
    pub record_id: &'a str,
    pub resent: bool,
}

impl Display for RecordSent<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.resent {
            write!(f, "resend success {}", self.record_id)
        } else {
            write!(f, "sink {} sent {}", self.node, self.record_id)
        }
    }
}

impl StructuredLog for RecordSent<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            record_id = self.record_id,
            resent = self.resent,
            "{}", self
        );
    }
}

/// Record dropped without delivery.
///
/// # Log Level
/// `error!` - Data loss
pub struct RecordDropped<'a> {
    pub node: &'a str,
    pub record_id: &'a str,
    pub reason: &'a str,
}

impl Display for RecordDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}, drop {} at sink {}", self.reason, self.record_id, self.node)
    }
}

impl StructuredLog for RecordDropped<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            record_id = self.record_id,
            reason = self.reason,
            "{}", self
        );
    }
}

/// Waiting for the next resend tick.
///
/// # Log Level
/// `debug!` - Per-record tracing
pub struct ResendWaiting<'a> {
    pub record_id: &'a str,
    pub attempt: u32,
}

impl Display for ResendWaiting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "wait resending {} (attempt {})", self.record_id, self.attempt)
    }
}

impl StructuredLog for ResendWaiting<'_> {
    fn log(&self) {
        tracing::debug!(record_id = self.record_id, attempt = self.attempt, "{}", self);
    }
}

/// The rule stopped while a record was being retried.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RetryAborted<'a> {
    pub record_id: &'a str,
}

impl Display for RetryAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "rule stop, exit retry for {}", self.record_id)
    }
}

impl StructuredLog for RetryAborted<'_> {
    fn log(&self) {
        tracing::info!(record_id = self.record_id, "{}", self);
    }
}

/// The sink reported a connection status change.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConnectionStatusChanged<'a> {
    pub status: &'a str,
    pub message: &'a str,
}

impl Display for ConnectionStatusChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "sink connection status: {}", self.status)
        } else {
            write!(f, "sink connection status: {} ({})", self.status, self.message)
        }
    }
}

impl StructuredLog for ConnectionStatusChanged<'_> {
    fn log(&self) {
        tracing::info!(status = self.status, message = self.message, "{}", self);
    }
}

/// The node received its last expected EOF marker.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EofLimitReached<'a> {
    pub node: &'a str,
    pub source: &'a str,
    pub limit: usize,
}

impl Display for EofLimitReached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "sink {} received {} EOF markers, last from {}",
            self.node, self.limit, self.source
        )
    }
}

impl StructuredLog for EofLimitReached<'_> {
    fn log(&self) {
        tracing::info!(node = self.node, source = self.source, limit = self.limit, "{}", self);
    }
}

/// Sink node closed and its resources released.
///
/// # Log Level
/// `info!` on success, `warn!` when the sink failed to close cleanly
pub struct SinkClosed<'a> {
    pub node: &'a str,
    pub error: Option<&'a dyn std::error::Error>,
}

impl Display for SinkClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.error {
            Some(error) => write!(f, "sink {} closed with error: {}", self.node, error),
            None => write!(f, "sink {} closed", self.node),
        }
    }
}

impl StructuredLog for SinkClosed<'_> {
    fn log(&self) {
        match self.error {
            Some(error) => tracing::warn!(node = self.node, error = %error, "{}", self),
            None => tracing::info!(node = self.node, "{}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_dropped_names_reason_and_record() {
        let msg = RecordDropped {
            node: "file_sink",
            record_id: "demo@1",
            reason: "no io error",
        };
        assert_eq!(msg.to_string(), "no io error, drop demo@1 at sink file_sink");
    }

    #[test]
    fn connection_status_omits_empty_message() {
        let msg = ConnectionStatusChanged {
            status: "connected",
            message: "",
        };
        assert_eq!(msg.to_string(), "sink connection status: connected");
    }
}
