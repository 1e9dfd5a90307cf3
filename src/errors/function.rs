// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for analytic function binding, evaluation and state access.

use serde_json::Value;
use thiserror::Error;

/// Failures of the per-rule state store behind a function context.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state store is closed")]
    Closed,

    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("expect {expected} args but got {got}")]
    Arity { expected: String, got: usize },

    /// Static validation rejected a literal argument type.
    #[error("Expect {expected} type for parameter {}", index + 1)]
    ArgType { index: usize, expected: &'static str },

    #[error("{position} arg is not a bool but got {got}")]
    NotBool { position: &'static str, got: Value },

    #[error("error converting arg {got} to int")]
    NotInteger { got: Value },

    #[error("the index should not be a negative integer")]
    NegativeIndex,

    #[error("lookback size {size} exceeds the maximum of {max}")]
    SizeTooLarge { size: u64, max: usize },

    #[error("partition key is not a string but got {0}")]
    BadKey(Value),

    #[error("error {op} state for {key}: {source}")]
    State {
        op: &'static str,
        key: String,
        #[source]
        source: StateError,
    },

    #[error("corrupt lookback state for {key}: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown function {0}")]
    UnknownFunction(String),
}
