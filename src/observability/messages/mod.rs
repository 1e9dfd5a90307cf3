// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its level with structured fields.
//!
//! * `rule` - panic recovery and error drain events
//! * `sink` - sink node lifecycle, delivery, resend and retry events
//! * `function` - analytic function evaluation events

pub mod function;
pub mod rule;
pub mod sink;

use std::fmt::Display;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a tracing event.
    fn log(&self);
}
