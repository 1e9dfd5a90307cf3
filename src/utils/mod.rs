// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod drain;
mod safe_run;
mod ticker;

pub use drain::{drain_error, error_channel, ErrorReceiver, ErrorSender};
pub use safe_run::{msg_with_stack, safe_run, safe_run_async, spawn_isolated};
pub use ticker::{get_ticker, Ticker};
