// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while connecting to, collecting into, or closing a sink.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    /// Transient network/storage failure reported by the sink itself.
    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Transport(#[from] std::io::Error),

    /// The collect strategy received a payload it cannot deliver.
    #[error("expect {expected} data type but got {got}")]
    TypeMismatch { expected: &'static str, got: String },

    /// A raw payload could not be decoded into a structured message.
    #[error("decode raw payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The destination refused the record; retrying will not help.
    #[error("{0}")]
    Rejected(String),
}

impl SinkError {
    pub fn io(message: impl Into<String>) -> Self {
        SinkError::Io(message.into())
    }

    /// I/O-class errors are the only ones eligible for timed retry.
    pub fn is_io(&self) -> bool {
        matches!(self, SinkError::Io(_) | SinkError::Transport(_))
    }
}
