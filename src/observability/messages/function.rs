// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for analytic function evaluation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A function call failed for one row; the row does not emit.
///
/// # Log Level
/// `warn!` - Single malformed row, pipeline continues
///
/// # Example
/// ```
/// use edgeflow::observability::messages::function::FunctionEvalFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "first arg is not a bool");
/// let msg = FunctionEvalFailed { function: "changed_col", error: &error };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct FunctionEvalFailed<'a> {
    pub function: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FunctionEvalFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "function {} failed: {}", self.function, self.error)
    }
}

impl StructuredLog for FunctionEvalFailed<'_> {
    fn log(&self) {
        tracing::warn!(function = self.function, error = %self.error, "{}", self);
    }
}
