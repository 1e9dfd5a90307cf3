// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::DEFAULT_RESEND_INTERVAL;
use crate::config::{RuleOption, SinkConf};

/// Effective settings of a sink node, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    /// Zero disables in-place retry.
    pub resend_interval: Duration,
    pub buffer_length: usize,
    pub send_error: bool,
}

impl SinkSettings {
    /// Derive node settings from rule and sink configuration.
    ///
    /// A retry node is the sink instance fed by another node's resend
    /// side-channel; it always retries and buffers up to the memory cache
    /// threshold.
    pub fn resolve(options: &RuleOption, conf: &SinkConf, is_retry: bool) -> Self {
        let mut resend_interval = Duration::from_millis(conf.resend_interval_ms.max(0) as u64);
        if (conf.enable_cache || is_retry) && resend_interval.is_zero() {
            resend_interval = DEFAULT_RESEND_INTERVAL;
        }
        let buffer_length = if is_retry || (conf.enable_cache && !conf.resend_alter_queue) {
            conf.memory_cache_threshold
        } else {
            conf.buffer_length
        };
        Self {
            resend_interval,
            buffer_length: buffer_length.max(1),
            send_error: options.send_error,
        }
    }

    pub fn retries_in_place(&self) -> bool {
        !self.resend_interval.is_zero()
    }
}
