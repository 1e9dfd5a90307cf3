// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fault isolation for rule logic.
//!
//! Every task that runs rule logic goes through [`safe_run`],
//! [`safe_run_async`] or [`spawn_isolated`], so a defect in one rule turns
//! into a [`RuleError`] for that rule instead of unwinding into the host.

use std::any::Any;
use std::error::Error;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use backtrace::{Backtrace, BacktraceFrame};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::engine::StreamContext;
use crate::errors::{ConfigError, FunctionError, RuleError, SinkError};
use crate::observability::messages::{rule::PanicRecovered, StructuredLog};
use crate::utils::{drain_error, ErrorSender};

const NON_STRING_PAYLOAD: &str = "panic with non-string payload";

/// Run `unit`, converting a panic into a [`RuleError`].
///
/// Errors returned normally pass through untouched.
///
/// ```
/// use edgeflow::utils::safe_run;
///
/// let err = safe_run(|| -> Result<(), edgeflow::errors::RuleError> { panic!("boom") }).unwrap_err();
/// assert_eq!(err.to_string(), "boom");
/// ```
pub fn safe_run<T, F>(unit: F) -> Result<T, RuleError>
where
    F: FnOnce() -> Result<T, RuleError>,
{
    match panic::catch_unwind(AssertUnwindSafe(unit)) {
        Ok(result) => result,
        Err(payload) => Err(recover(payload)),
    }
}

/// Await `unit`, converting a panic raised while polling it into a
/// [`RuleError`].
pub async fn safe_run_async<T, F>(unit: F) -> Result<T, RuleError>
where
    F: Future<Output = Result<T, RuleError>>,
{
    match AssertUnwindSafe(unit).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(recover(payload)),
    }
}

/// Launch `unit` as its own task under fault isolation. Whatever error it
/// ends with, returned or panicked, goes to `err_tx` through the drain.
pub fn spawn_isolated<F>(ctx: StreamContext, err_tx: ErrorSender, unit: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), RuleError>> + Send + 'static,
{
    let span = ctx.span().clone();
    tokio::spawn(
        async move {
            if let Err(err) = safe_run_async(unit).await {
                drain_error(Some(&ctx), Some(err), &err_tx);
            }
        }
        .instrument(span),
    )
}

/// `msg` followed by the call stack of whoever called the caller.
///
/// The frames of this function and of its direct caller are left out.
#[inline(never)]
pub fn msg_with_stack(msg: &str) -> String {
    let trace = Backtrace::new();
    let frames = trace.frames();
    let own = frames
        .iter()
        .position(|frame| frame_named(frame, "msg_with_stack"))
        .unwrap_or(0);
    let outer: Vec<BacktraceFrame> = frames.iter().skip(own + 2).cloned().collect();
    format!("{}\nStack:\n{:?}", msg, Backtrace::from(outer))
}

fn frame_named(frame: &BacktraceFrame, name: &str) -> bool {
    frame.symbols().iter().any(|symbol| {
        symbol
            .name()
            .map(|n| n.to_string().contains(name))
            .unwrap_or(false)
    })
}

fn recover(payload: Box<dyn Any + Send>) -> RuleError {
    let stack = format!("{:?}", Backtrace::new());
    let err = into_rule_error(payload, &stack);
    PanicRecovered {
        error: &err,
        stack: &stack,
    }
    .log();
    err
}

fn into_rule_error(payload: Box<dyn Any + Send>, stack: &str) -> RuleError {
    let payload = match payload.downcast::<RuleError>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<SinkError>() {
        Ok(err) => return RuleError::Sink(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<FunctionError>() {
        Ok(err) => return RuleError::Function(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<ConfigError>() {
        Ok(err) => return RuleError::Config(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<anyhow::Error>() {
        Ok(err) => return RuleError::Other(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Box<dyn Error + Send + Sync>>() {
        Ok(err) => return RuleError::Other(anyhow::anyhow!(*err)),
        Err(payload) => payload,
    };
    let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        NON_STRING_PAYLOAD.to_string()
    };
    RuleError::Panic {
        message,
        stack: stack.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SinkError;
    use crate::utils::error_channel;

    #[test]
    fn string_panic_becomes_plain_error() {
        let err = safe_run(|| -> Result<(), RuleError> { panic!("index out of range") }).unwrap_err();
        assert!(matches!(err, RuleError::Panic { .. }));
        assert_eq!(err.to_string(), "index out of range");
    }

    #[test]
    fn formatted_panic_keeps_message_and_stack() {
        let err = safe_run(|| -> Result<(), RuleError> { panic!("bad key {}", 7) }).unwrap_err();
        match err {
            RuleError::Panic { message, stack } => {
                assert_eq!(message, "bad key 7");
                assert!(!stack.is_empty());
            }
            other => panic!("expected panic error, got {other:?}"),
        }
    }

    #[test]
    fn error_payload_passes_through() {
        let err = safe_run(|| -> Result<(), RuleError> {
            std::panic::panic_any(RuleError::Sink(SinkError::Rejected("quota".into())))
        })
        .unwrap_err();
        assert!(matches!(err, RuleError::Sink(SinkError::Rejected(ref m)) if m == "quota"));
    }

    #[test]
    fn sink_error_payload_passes_through() {
        let err = safe_run(|| -> Result<(), RuleError> { std::panic::panic_any(SinkError::io("disk gone")) })
            .unwrap_err();
        assert!(matches!(err, RuleError::Sink(SinkError::Io(ref m)) if m == "disk gone"));
        assert!(crate::errors::is_io_error(&err));
    }

    #[test]
    fn function_and_config_payloads_pass_through() {
        let err = safe_run(|| -> Result<(), RuleError> { std::panic::panic_any(FunctionError::NegativeIndex) })
            .unwrap_err();
        assert!(matches!(err, RuleError::Function(FunctionError::NegativeIndex)));

        let err = safe_run(|| -> Result<(), RuleError> {
            std::panic::panic_any(ConfigError::Invalid("bad threshold".into()))
        })
        .unwrap_err();
        assert!(matches!(err, RuleError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn boxed_error_payload_keeps_its_message() {
        let err = safe_run(|| -> Result<(), RuleError> {
            let boxed: Box<dyn Error + Send + Sync> = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "pipe closed"));
            std::panic::panic_any(boxed)
        })
        .unwrap_err();
        assert!(matches!(err, RuleError::Other(_)));
        assert_eq!(err.to_string(), "pipe closed");
    }

    async fn rejecting_unit() -> Result<(), RuleError> {
        tokio::task::yield_now().await;
        std::panic::panic_any(SinkError::Rejected("quota".into()))
    }

    #[tokio::test]
    async fn async_error_payload_passes_through() {
        let err = safe_run_async(rejecting_unit()).await.unwrap_err();
        assert!(matches!(err, RuleError::Sink(SinkError::Rejected(_))));
    }

    #[test]
    fn anyhow_payload_passes_through() {
        let err = safe_run(|| -> Result<(), RuleError> {
            std::panic::panic_any(anyhow::anyhow!("wrapped"))
        })
        .unwrap_err();
        assert!(matches!(err, RuleError::Other(_)));
        assert_eq!(err.to_string(), "wrapped");
    }

    #[test]
    fn other_payload_is_described() {
        let err = safe_run(|| -> Result<(), RuleError> { std::panic::panic_any(42_u8) }).unwrap_err();
        assert_eq!(err.to_string(), NON_STRING_PAYLOAD);
    }

    #[test]
    fn returned_error_and_value_pass_through() {
        let err = safe_run(|| -> Result<(), RuleError> { Err(RuleError::Eof("src".into())) }).unwrap_err();
        assert!(err.is_eof());
        assert_eq!(safe_run(|| Ok::<_, RuleError>(5)).unwrap(), 5);
    }

    #[tokio::test]
    async fn async_panic_is_caught_after_await() {
        let err = safe_run_async(async {
            tokio::task::yield_now().await;
            let values: Vec<i32> = Vec::new();
            Ok::<i32, RuleError>(values[3])
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("index out of bounds"));
    }

    async fn faulty_unit() -> Result<(), RuleError> {
        panic!("sink defect")
    }

    #[tokio::test]
    async fn spawned_panic_is_drained_not_propagated() {
        let ctx = StreamContext::new("rule1");
        let (err_tx, mut err_rx) = error_channel();
        let handle = spawn_isolated(ctx, err_tx, faulty_unit());
        handle.await.unwrap();
        let err = err_rx.recv().await.unwrap();
        assert_eq!(err.to_string(), "sink defect");
    }

    #[inline(never)]
    fn annotate_from_helper() -> String {
        msg_with_stack("state corrupted")
    }

    #[test]
    fn stack_annotation_skips_own_frames() {
        let msg = annotate_from_helper();
        assert!(msg.starts_with("state corrupted\nStack:\n"));
        assert!(!msg.contains("msg_with_stack"));
        assert!(!msg.contains("annotate_from_helper"));
    }
}
