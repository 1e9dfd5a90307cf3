// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Records flowing through a rule: raw byte tuples, structured message
//! tuples, and the closed set of items a sink node can receive.

mod item;
mod tuple;

pub use item::{StreamItem, WatermarkTuple};
pub use tuple::{now_millis, Message, MessageTuple, RawTuple};

/// Dynamic value carried by messages and analytic function state.
///
/// Equality is structural, so composite values compare deeply.
pub type Value = serde_json::Value;
