// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in function registry.
//!
//! The registry is an explicit value owned by whoever binds rules; there is
//! no process-wide table. Each entry pairs an evaluator with a validator
//! that checks argument shapes once, when a rule is bound.

pub mod analytic;
pub mod args;
pub mod ring_queue;
pub mod state;

use std::collections::HashMap;

pub use args::{produce_err_info, validate_len, ArgExpr};
pub use ring_queue::RingQueue;
pub use state::MemoryStateStore;

use crate::errors::FunctionError;
use crate::model::Value;
use crate::observability::messages::function::FunctionEvalFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::FunctionContext;

/// Result value and whether the row emits it.
pub type ExecResult = Result<(Value, bool), FunctionError>;

pub type ExecFn = fn(&mut dyn FunctionContext, &[Value]) -> ExecResult;

pub type ValidateFn = fn(&[ArgExpr]) -> Result<(), FunctionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncType {
    Scalar,
}

#[derive(Debug, Clone, Copy)]
pub struct BuiltinFunc {
    pub func_type: FuncType,
    pub exec: ExecFn,
    pub val: ValidateFn,
}

#[derive(Debug, Default)]
pub struct FunctionRegistry {
    funcs: HashMap<&'static str, BuiltinFunc>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        analytic::register_analytic_funcs(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &'static str, func: BuiltinFunc) {
        self.funcs.insert(name, func);
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinFunc> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.funcs.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Evaluate `name` for one row. A failure means the row does not emit;
    /// it is logged here and returned to the caller.
    pub fn exec(&self, name: &str, ctx: &mut dyn FunctionContext, args: &[Value]) -> ExecResult {
        let func = self
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        let result = (func.exec)(ctx, args);
        if let Err(err) = &result {
            FunctionEvalFailed {
                function: name,
                error: err,
            }
            .log();
        }
        result
    }

    /// Check argument shapes when a rule is bound.
    pub fn validate(&self, name: &str, args: &[ArgExpr]) -> Result<(), FunctionError> {
        let func = self
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        (func.val)(args)
    }
}
