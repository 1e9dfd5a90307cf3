// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::panic::Location;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::engine::StreamContext;
use crate::errors::RuleError;
use crate::observability::messages::rule::{DrainSlotTaken, RuntimeErrorDrained};
use crate::observability::messages::StructuredLog;

pub type ErrorSender = mpsc::Sender<RuleError>;
pub type ErrorReceiver = mpsc::Receiver<RuleError>;

/// The single-slot error outlet of a rule run.
pub fn error_channel() -> (ErrorSender, ErrorReceiver) {
    mpsc::channel(1)
}

/// Log `err` with the caller's location and try to hand it to the rule
/// supervisor without waiting.
///
/// Only the first error of a run is ever delivered; when the slot is taken
/// or the receiver is gone the error is skipped. `None` is a no-op.
#[track_caller]
pub fn drain_error(ctx: Option<&StreamContext>, err: Option<RuleError>, err_tx: &ErrorSender) {
    let Some(err) = err else {
        return;
    };
    let location = Location::caller();
    let drained = RuntimeErrorDrained {
        file: location.file(),
        line: location.line(),
        error: &err,
    };
    match ctx {
        Some(ctx) => ctx.in_scope(|| drained.log()),
        None => drained.log(),
    }

    if let Err(e) = err_tx.try_send(err) {
        let (err, closed) = match e {
            TrySendError::Full(err) => (err, false),
            TrySendError::Closed(err) => (err, true),
        };
        DrainSlotTaken {
            error: &err,
            closed,
        }
        .log();
    }
}
