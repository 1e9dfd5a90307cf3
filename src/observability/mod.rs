// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Diagnostic and operational log lines are produced by struct-based message
//! types with a `Display` implementation, so there are no magic strings in
//! the runtime code and every event carries consistent structured fields.
//!
//! Messages are organized by subsystem:
//! * `messages::rule` - fault isolation and error drain events
//! * `messages::sink` - sink node lifecycle, delivery and retry events
//! * `messages::function` - analytic function evaluation events
//!
//! # Usage
//!
//! ```rust
//! use edgeflow::observability::messages::{sink::RecordDropped, StructuredLog};
//!
//! RecordDropped {
//!     node: "mqtt_sink",
//!     record_id: "demo@1700000000000",
//!     reason: "non-io error",
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
