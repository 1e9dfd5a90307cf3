// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod function;
mod rule;
mod sink;

pub use config::ConfigError;
pub use function::{FunctionError, StateError};
pub use rule::RuleError;
pub use sink::SinkError;

/// Reports whether `err` is an I/O-class sink failure, the only class a sink
/// node retries on its resend timer.
pub fn is_io_error(err: &RuleError) -> bool {
    matches!(err, RuleError::Sink(sink_err) if sink_err.is_io())
}
