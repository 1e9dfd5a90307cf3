// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::StateError;
use crate::model::Value;

/// Per-key state access given to stateful functions on every call.
///
/// Implementations must not run two writers for the same key concurrently
/// within one rule instance; the functions read, compare and write without
/// any compare-and-swap.
pub trait FunctionContext: Send {
    /// The value stored under `key`, or `None` if nothing was stored yet.
    fn get_state(&self, key: &str) -> Result<Option<Value>, StateError>;

    fn put_state(&mut self, key: &str, value: Value) -> Result<(), StateError>;
}
