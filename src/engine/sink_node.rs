// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sink execution node.
//!
//! A `SinkNode` is the skeleton around a sink: it owns the node's input
//! buffer, filters control markers, hands records to the sink through the
//! collect strategy and decides what happens when delivery fails:
//!
//! * with a resend side-channel, the record is offered to it without waiting
//!   and dropped if the channel is full;
//! * with a resend interval, I/O-class failures are retried in place on a
//!   timer until they succeed, stop being I/O-class, or the rule stops;
//! * otherwise the record is dropped after the failure is reported.
//!
//! Records are processed strictly in arrival order. A record under retry
//! holds back everything queued behind it on the same node.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::config::{RuleOption, SinkConf, SinkSettings};
use crate::engine::collect::Collector;
use crate::engine::stats::SinkStats;
use crate::engine::StreamContext;
use crate::errors::{is_io_error, ConfigError, RuleError};
use crate::model::StreamItem;
use crate::observability::messages::sink::*;
use crate::observability::messages::StructuredLog;
use crate::traits::{BytesCollector, ConnectionStatus, StatusCallback, TupleCollector};
use crate::utils::{drain_error, get_ticker, safe_run_async, spawn_isolated, ErrorSender};

/// A sink node as built by rule compilation, before it is started.
#[derive(Debug)]
pub struct SinkNode {
    name: String,
    collector: Collector,
    settings: SinkSettings,
    eof_limit: usize,
    input_tx: mpsc::Sender<StreamItem>,
    input_rx: mpsc::Receiver<StreamItem>,
    resend_out: Option<mpsc::Sender<StreamItem>>,
    stats: Arc<SinkStats>,
}

impl SinkNode {
    /// Sink node delivering raw payloads.
    pub fn new_bytes(
        ctx: &StreamContext,
        name: &str,
        sink: Arc<dyn BytesCollector>,
        options: &RuleOption,
        conf: &SinkConf,
        eof_limit: usize,
        is_retry: bool,
    ) -> Result<Self, ConfigError> {
        Self::new(ctx, name, Collector::Bytes(sink), options, conf, eof_limit, is_retry)
    }

    /// Sink node delivering structured messages.
    pub fn new_tuple(
        ctx: &StreamContext,
        name: &str,
        sink: Arc<dyn TupleCollector>,
        options: &RuleOption,
        conf: &SinkConf,
        eof_limit: usize,
        is_retry: bool,
    ) -> Result<Self, ConfigError> {
        Self::new(ctx, name, Collector::Tuple(sink), options, conf, eof_limit, is_retry)
    }

    fn new(
        ctx: &StreamContext,
        name: &str,
        collector: Collector,
        options: &RuleOption,
        conf: &SinkConf,
        eof_limit: usize,
        is_retry: bool,
    ) -> Result<Self, ConfigError> {
        conf.validate()?;
        let settings = SinkSettings::resolve(options, conf, is_retry);
        ctx.in_scope(|| {
            SinkNodeCreated {
                node: name,
                strategy: collector.strategy(),
                is_retry,
                resend_interval: settings.resend_interval,
                buffer_length: settings.buffer_length,
            }
            .log()
        });
        let (input_tx, input_rx) = mpsc::channel(settings.buffer_length);
        Ok(Self {
            name: name.to_string(),
            collector,
            settings,
            eof_limit,
            input_tx,
            input_rx,
            resend_out: None,
            stats: Arc::new(SinkStats::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    /// Sender for upstream operators. The node stops once every sender is
    /// dropped and the buffer is drained.
    pub fn input(&self) -> mpsc::Sender<StreamItem> {
        self.input_tx.clone()
    }

    pub fn stats(&self) -> Arc<SinkStats> {
        Arc::clone(&self.stats)
    }

    /// Route records that fail delivery to `output` instead of retrying them
    /// here.
    pub fn set_resend_output(&mut self, output: mpsc::Sender<StreamItem>) {
        self.resend_out = Some(output);
    }

    /// Start the node's task. It runs until the rule is cancelled or the
    /// input closes; errors, including the EOF signal, go to `err_tx`.
    pub fn exec(self, ctx: StreamContext, err_tx: ErrorSender) -> JoinHandle<()> {
        let SinkNode {
            name,
            collector,
            settings,
            eof_limit,
            input_tx,
            input_rx,
            resend_out,
            stats,
        } = self;
        drop(input_tx);

        let mut task = SinkTask {
            name,
            collector,
            settings,
            eof_limit,
            current_eof: 0,
            input: input_rx,
            resend_out,
            stats,
        };
        let task_ctx = ctx.clone();
        let task_err_tx = err_tx.clone();
        spawn_isolated(ctx, err_tx, async move { task.run(&task_ctx, &task_err_tx).await })
    }
}

/// The running half of a sink node, owned by its task.
struct SinkTask {
    name: String,
    collector: Collector,
    settings: SinkSettings,
    eof_limit: usize,
    current_eof: usize,
    input: mpsc::Receiver<StreamItem>,
    resend_out: Option<mpsc::Sender<StreamItem>>,
    stats: Arc<SinkStats>,
}

impl SinkTask {
    async fn run(&mut self, ctx: &StreamContext, err_tx: &ErrorSender) -> Result<(), RuleError> {
        let stats = Arc::clone(&self.stats);
        let status: StatusCallback = Arc::new(move |status: ConnectionStatus, message: &str| {
            connection_status_change(&stats, status, message)
        });
        if let Err(err) = self.collector.connect(ctx, status).await {
            drain_error(Some(ctx), Some(err.into()), err_tx);
        }

        let result = safe_run_async(self.consume(ctx, err_tx)).await;
        self.close(ctx).await;
        result
    }

    async fn consume(&mut self, ctx: &StreamContext, err_tx: &ErrorSender) -> Result<(), RuleError> {
        self.current_eof = 0;
        loop {
            let item = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Ok(()),
                item = self.input.recv() => match item {
                    Some(item) => item,
                    None => return Ok(()),
                },
            };
            let Some(item) = self.ingest(ctx, err_tx, item) else {
                continue;
            };

            self.on_process_start(ctx, &item);
            let result = self.collector.collect(ctx, &item).await;
            match result {
                Ok(()) => self.on_send(&item, false),
                Err(err) => {
                    let err = RuleError::from(err);
                    self.on_error(&err);
                    if self.resend_out.is_some() {
                        self.resend(ctx, item);
                    } else if self.settings.retries_in_place() {
                        if !is_io_error(&err) {
                            self.drop_record(&item, "no io error");
                        } else if !self.retry(ctx, &item, err).await {
                            return Ok(());
                        }
                    } else {
                        self.drop_record(&item, "send failed");
                    }
                }
            }
            self.on_process_end();
        }
    }

    /// Classify an incoming item; `None` means it was consumed here.
    fn ingest(&mut self, ctx: &StreamContext, err_tx: &ErrorSender, item: StreamItem) -> Option<StreamItem> {
        RecordReceived {
            op_id: ctx.op_id(),
            instance_id: ctx.instance_id(),
            kind: &item.kind(),
        }
        .log();
        match &item {
            StreamItem::Error(_) => self.settings.send_error.then_some(item),
            StreamItem::Watermark(_) | StreamItem::BatchEof => None,
            StreamItem::Eof(source) => {
                self.current_eof += 1;
                if self.current_eof == self.eof_limit {
                    EofLimitReached {
                        node: &self.name,
                        source,
                        limit: self.eof_limit,
                    }
                    .log();
                    drain_error(Some(ctx), Some(RuleError::Eof(source.clone())), err_tx);
                }
                None
            }
            _ => Some(item),
        }
    }

    /// Offer a failed record to the resend side-channel without waiting.
    fn resend(&self, ctx: &StreamContext, item: StreamItem) {
        let Some(out) = &self.resend_out else {
            return;
        };
        match out.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(item)) => {
                self.on_error(&RuleError::BufferFull {
                    node: self.name.clone(),
                });
                self.drop_record(&item, "resend buffer full");
            }
            Err(TrySendError::Closed(item)) => {
                if !ctx.is_cancelled() {
                    self.drop_record(&item, "resend sink closed");
                }
            }
        }
    }

    /// Retry an I/O-class failure on the resend timer. Returns `false` when
    /// the rule was cancelled while waiting.
    async fn retry(&self, ctx: &StreamContext, item: &StreamItem, mut err: RuleError) -> bool {
        let record_id = item.id();
        let mut ticker = get_ticker(self.settings.resend_interval);
        let mut attempt = 0;
        while is_io_error(&err) {
            attempt += 1;
            ResendWaiting {
                record_id: &record_id,
                attempt,
            }
            .log();
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    RetryAborted { record_id: &record_id }.log();
                    return false;
                }
                _ = ticker.tick() => {
                    let result = self.collector.collect(ctx, item).await;
                    self.update_buffer_length();
                    match result {
                        Ok(()) => {
                            self.on_send(item, true);
                            return true;
                        }
                        Err(e) => err = e.into(),
                    }
                }
            }
        }
        ticker.stop();
        self.drop_record(item, &format!("no io error {}", err));
        true
    }

    async fn close(&mut self, ctx: &StreamContext) {
        let result = self.collector.close(ctx).await;
        self.input.close();
        SinkClosed {
            node: &self.name,
            error: result.as_ref().err().map(|e| e as &dyn std::error::Error),
        }
        .log();
    }

    fn on_process_start(&self, ctx: &StreamContext, item: &StreamItem) {
        self.stats.process_start();
        tracing::debug!(
            op_id = ctx.op_id(),
            instance_id = ctx.instance_id(),
            record_id = %item.id(),
            "{}_{} receive data",
            ctx.op_id(),
            ctx.instance_id()
        );
    }

    fn on_send(&self, item: &StreamItem, resent: bool) {
        self.stats.inc_records_out();
        RecordSent {
            node: &self.name,
            record_id: &item.id(),
            resent,
        }
        .log();
    }

    fn on_error(&self, err: &dyn std::error::Error) {
        self.stats.inc_exceptions(&err.to_string());
        CollectFailed {
            node: &self.name,
            error: err,
        }
        .log();
    }

    fn on_process_end(&self) {
        self.stats.process_end();
        self.update_buffer_length();
    }

    fn drop_record(&self, item: &StreamItem, reason: &str) {
        RecordDropped {
            node: &self.name,
            record_id: &item.id(),
            reason,
        }
        .log();
    }

    fn update_buffer_length(&self) {
        self.stats.set_buffer_length(self.input.len() as i64);
    }
}

fn connection_status_change(stats: &SinkStats, status: ConnectionStatus, message: &str) {
    if status == ConnectionStatus::Disconnected {
        stats.inc_exceptions(message);
    }
    stats.set_connection_state(status, message);
    ConnectionStatusChanged {
        status: status.as_str(),
        message,
    }
    .log();
}
