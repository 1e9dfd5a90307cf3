// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime counters of a sink node.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::traits::ConnectionStatus;

/// Counters updated by the sink loop and the sink's status callback.
///
/// Shared as `Arc<SinkStats>` between the node task and whoever exports the
/// numbers; all updates are lock-free except the few text fields.
#[derive(Debug, Default)]
pub struct SinkStats {
    records_in: AtomicU64,
    records_out: AtomicU64,
    exceptions: AtomicU64,
    buffer_length: AtomicI64,
    last_latency_us: AtomicU64,
    process_started: Mutex<Option<Instant>>,
    last_exception: Mutex<Option<String>>,
    connection: Mutex<Option<(ConnectionStatus, String)>>,
}

/// Point-in-time copy of [`SinkStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub records_in: u64,
    pub records_out: u64,
    pub exceptions: u64,
    pub last_exception: Option<String>,
    pub buffer_length: i64,
    pub last_latency: Duration,
    pub connection_status: Option<ConnectionStatus>,
    pub connection_message: String,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_start(&self) {
        self.records_in.fetch_add(1, Ordering::Relaxed);
        *lock(&self.process_started) = Some(Instant::now());
    }

    pub fn process_end(&self) {
        if let Some(started) = lock(&self.process_started).take() {
            self.last_latency_us
                .store(started.elapsed().as_micros() as u64, Ordering::Relaxed);
        }
    }

    pub fn inc_records_out(&self) {
        self.records_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_exceptions(&self, message: &str) {
        self.exceptions.fetch_add(1, Ordering::Relaxed);
        *lock(&self.last_exception) = Some(message.to_string());
    }

    pub fn set_buffer_length(&self, length: i64) {
        self.buffer_length.store(length, Ordering::Relaxed);
    }

    pub fn set_connection_state(&self, status: ConnectionStatus, message: &str) {
        *lock(&self.connection) = Some((status, message.to_string()));
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let (connection_status, connection_message) = match lock(&self.connection).clone() {
            Some((status, message)) => (Some(status), message),
            None => (None, String::new()),
        };
        StatsSnapshot {
            records_in: self.records_in.load(Ordering::Relaxed),
            records_out: self.records_out.load(Ordering::Relaxed),
            exceptions: self.exceptions.load(Ordering::Relaxed),
            last_exception: lock(&self.last_exception).clone(),
            buffer_length: self.buffer_length.load(Ordering::Relaxed),
            last_latency: Duration::from_micros(self.last_latency_us.load(Ordering::Relaxed)),
            connection_status,
            connection_message,
        }
    }
}
