// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{ConfigError, FunctionError, SinkError};

/// Errors surfaced to a rule's supervisor through the error drain.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A runtime panic recovered by the fault isolation wrapper. Displays as
    /// the panic message alone; the stack is kept for diagnostics.
    #[error("{message}")]
    Panic { message: String, stack: String },

    /// Graceful end of stream: the node saw as many EOF markers as it expects.
    #[error("EOF: {0}")]
    Eof(String),

    /// A failed record could not be handed to the resend side-channel.
    #[error("buffer full, drop message from {node} to resend sink")]
    BufferFull { node: String },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Function(#[from] FunctionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RuleError {
    pub fn is_eof(&self) -> bool {
        matches!(self, RuleError::Eof(_))
    }
}
