// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for fault isolation and error propagation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A panic was recovered inside an isolated unit of work.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PanicRecovered<'a> {
    pub error: &'a dyn std::error::Error,
    pub stack: &'a str,
}

impl Display for PanicRecovered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "recovered panic: {}\npanic stack:\n{}", self.error, self.stack)
    }
}

impl StructuredLog for PanicRecovered<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

/// A runtime error was handed to the error drain.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use edgeflow::observability::messages::rule::RuntimeErrorDrained;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = RuntimeErrorDrained {
///     file: "src/engine/sink_node.rs",
///     line: 42,
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "runtime error from src/engine/sink_node.rs/l42: test error");
/// ```
pub struct RuntimeErrorDrained<'a> {
    pub file: &'a str,
    pub line: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for RuntimeErrorDrained<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "runtime error from {}/l{}: {}", self.file, self.line, self.error)
    }
}

impl StructuredLog for RuntimeErrorDrained<'_> {
    fn log(&self) {
        tracing::error!(
            file = self.file,
            line = self.line,
            error = %self.error,
            "{}", self
        );
    }
}

/// The drain already holds an error (or nobody listens); this one is skipped.
///
/// # Log Level
/// `debug!` - Expected after the first error of a rule run
pub struct DrainSlotTaken<'a> {
    pub error: &'a dyn std::error::Error,
    pub closed: bool,
}

impl Display for DrainSlotTaken<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let why = if self.closed { "receiver gone" } else { "slot taken" };
        write!(f, "skip draining error ({}): {}", why, self.error)
    }
}

impl StructuredLog for DrainSlotTaken<'_> {
    fn log(&self) {
        tracing::debug!(closed = self.closed, error = %self.error, "{}", self);
    }
}
