// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod collect;
pub mod context;
pub mod sink_node;
pub mod stats;

pub use collect::Collector;
pub use context::StreamContext;
pub use sink_node::SinkNode;
pub use stats::{SinkStats, StatsSnapshot};
