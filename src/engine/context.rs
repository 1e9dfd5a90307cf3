// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::Span;

/// Execution context handed to every operator of a running rule.
///
/// Carries the operator identity, the rule-wide cancellation signal and a
/// tracing span tagged with both, which is where the operator logs.
#[derive(Debug, Clone)]
pub struct StreamContext {
    rule_id: Arc<str>,
    op_id: Arc<str>,
    instance_id: usize,
    cancel: CancellationToken,
    span: Span,
}

impl StreamContext {
    /// Root context of a rule run with a fresh cancellation signal.
    pub fn new(rule_id: impl Into<String>) -> Self {
        let rule_id: String = rule_id.into();
        Self::build(Arc::from(rule_id), Arc::from(""), 0, CancellationToken::new())
    }

    /// Context for one operator instance; shares the rule's cancellation.
    pub fn for_op(&self, op_id: impl Into<String>, instance_id: usize) -> Self {
        let op_id: String = op_id.into();
        Self::build(
            Arc::clone(&self.rule_id),
            Arc::from(op_id),
            instance_id,
            self.cancel.clone(),
        )
    }

    fn build(rule_id: Arc<str>, op_id: Arc<str>, instance_id: usize, cancel: CancellationToken) -> Self {
        let span = tracing::info_span!(
            "rule",
            rule_id = %rule_id,
            op_id = %op_id,
            instance_id = instance_id,
        );
        Self {
            rule_id,
            op_id,
            instance_id,
            cancel,
            span,
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    pub fn instance_id(&self) -> usize {
        self.instance_id
    }

    /// Stop the whole rule: every context sharing this signal observes it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        self.span.in_scope(f)
    }
}
