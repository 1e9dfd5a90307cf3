// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // sink + rule options
pub mod engine;     // sink node execution
pub mod errors;     // error handling
pub mod functions;  // stateful analytic functions
pub mod model;      // stream records
pub mod observability;
pub mod traits;     // sink + state store abstractions
pub mod utils;      // fault isolation, error drain, tickers
