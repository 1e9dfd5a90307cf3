// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod function;
pub mod sink;

pub use function::FunctionContext;
pub use sink::{BytesCollector, ConnectionStatus, Sink, StatusCallback, TupleCollector};
