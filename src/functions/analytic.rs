// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stateful analytic functions.
//!
//! Every call receives its positional arguments followed by two trailing
//! values appended by the binder: the row validity flag and the partition
//! state key. State lives in the [`FunctionContext`] under that key, so one
//! function instance tracks many partitions independently.

use crate::config::consts::MAX_LAG_SIZE;
use crate::errors::{FunctionError, StateError};
use crate::functions::args::{produce_err_info, validate_len, ArgExpr};
use crate::functions::ring_queue::RingQueue;
use crate::functions::{BuiltinFunc, ExecResult, FuncType, FunctionRegistry};
use crate::model::Value;
use crate::traits::FunctionContext;

pub fn register_analytic_funcs(registry: &mut FunctionRegistry) {
    registry.register(
        "changed_col",
        BuiltinFunc {
            func_type: FuncType::Scalar,
            exec: changed_col,
            val: validate_changed_col,
        },
    );
    registry.register(
        "had_changed",
        BuiltinFunc {
            func_type: FuncType::Scalar,
            exec: had_changed,
            val: validate_had_changed,
        },
    );
    registry.register(
        "lag",
        BuiltinFunc {
            func_type: FuncType::Scalar,
            exec: lag,
            val: validate_lag,
        },
    );
    registry.register(
        "latest",
        BuiltinFunc {
            func_type: FuncType::Scalar,
            exec: latest,
            val: validate_latest,
        },
    );
}

/// Arguments split into positional values, the validity flag and the key.
struct Invocation<'a> {
    params: &'a [Value],
    validity: &'a Value,
    key: &'a str,
}

impl<'a> Invocation<'a> {
    fn split(args: &'a [Value]) -> Result<Self, FunctionError> {
        let [params @ .., validity, key] = args else {
            return Err(FunctionError::Arity {
                expected: "at least 2".to_string(),
                got: args.len(),
            });
        };
        let key = key.as_str().ok_or_else(|| FunctionError::BadKey(key.clone()))?;
        Ok(Self { params, validity, key })
    }

    fn is_valid(&self) -> Result<bool, FunctionError> {
        as_bool(self.validity, "when")
    }
}

fn as_bool(value: &Value, position: &'static str) -> Result<bool, FunctionError> {
    value.as_bool().ok_or_else(|| FunctionError::NotBool {
        position,
        got: value.clone(),
    })
}

fn get(ctx: &dyn FunctionContext, key: &str) -> Result<Value, FunctionError> {
    ctx.get_state(key)
        .map(Option::unwrap_or_default)
        .map_err(|source| state_error("getting", key, source))
}

fn put(ctx: &mut dyn FunctionContext, key: &str, value: Value) -> Result<(), FunctionError> {
    ctx.put_state(key, value)
        .map_err(|source| state_error("setting", key, source))
}

fn state_error(op: &'static str, key: &str, source: StateError) -> FunctionError {
    FunctionError::State {
        op,
        key: key.to_string(),
        source,
    }
}

/// Emit the value only when it differs from the last one stored for the key.
/// Unchanged, ignored and invalid rows all yield null.
pub fn changed_col(ctx: &mut dyn FunctionContext, args: &[Value]) -> ExecResult {
    let call = Invocation::split(args)?;
    let [ignore_null, value, ..] = call.params else {
        return Err(FunctionError::Arity {
            expected: "2".to_string(),
            got: call.params.len(),
        });
    };
    if as_bool(ignore_null, "first")? && value.is_null() {
        return Ok((Value::Null, true));
    }
    if !call.is_valid()? {
        return Ok((Value::Null, true));
    }
    if get(ctx, call.key)? != *value {
        put(ctx, call.key, value.clone())?;
        return Ok((value.clone(), true));
    }
    Ok((Value::Null, true))
}

/// True when any tracked value differs from its last recorded value. Each
/// tracked position keeps its own state under the key suffixed with its
/// 1-based position.
pub fn had_changed(ctx: &mut dyn FunctionContext, args: &[Value]) -> ExecResult {
    let call = Invocation::split(args)?;
    if call.params.len() <= 1 {
        return Err(FunctionError::Arity {
            expected: "more than one".to_string(),
            got: args.len(),
        });
    }
    if !call.is_valid()? {
        return Ok((Value::Bool(false), true));
    }
    let ignore_null = as_bool(&call.params[0], "first")?;

    let mut changed = false;
    for (index, value) in call.params.iter().enumerate().skip(1) {
        if ignore_null && value.is_null() {
            continue;
        }
        let key = format!("{}{}", call.key, index);
        if get(ctx, &key)? != *value {
            changed = true;
            put(ctx, &key, value.clone())?;
        }
    }
    Ok((Value::Bool(changed), true))
}

/// The value seen `size` advances ago for the key, warming up from the
/// default value.
pub fn lag(ctx: &mut dyn FunctionContext, args: &[Value]) -> ExecResult {
    let call = Invocation::split(args)?;
    if !(1..=4).contains(&call.params.len()) {
        return Err(FunctionError::Arity {
            expected: "from 1 to 4".to_string(),
            got: call.params.len(),
        });
    }
    let stored = get(ctx, call.key)?;
    let valid = call.is_valid()?;
    let size = match call.params.get(1) {
        Some(size) => to_size(size)?,
        None => 1,
    };
    let default = call.params.get(2).cloned().unwrap_or_default();
    let ignore_null = match call.params.get(3) {
        Some(flag) => as_bool(flag, "fourth")?,
        None => true,
    };

    let (mut queue, mut dirty) = if stored.is_null() {
        let mut queue = RingQueue::new(size);
        queue.fill(&default);
        (queue, true)
    } else {
        let queue = RingQueue::from_value(stored).map_err(|source| FunctionError::CorruptState {
            key: call.key.to_string(),
            source,
        })?;
        (queue, false)
    };

    let value = &call.params[0];
    let mut result = queue.peek().clone();
    if valid && (!ignore_null || !value.is_null()) {
        result = queue.fetch();
        queue.append(value.clone());
        dirty = true;
    }
    if dirty {
        let persisted = queue.to_value().map_err(|source| FunctionError::CorruptState {
            key: call.key.to_string(),
            source,
        })?;
        put(ctx, call.key, persisted)?;
    }
    Ok((result, true))
}

/// Strict integer conversion for the lookback size.
fn to_size(value: &Value) -> Result<usize, FunctionError> {
    let n = value
        .as_i64()
        .ok_or_else(|| FunctionError::NotInteger { got: value.clone() })?;
    let n = u64::try_from(n).map_err(|_| FunctionError::NegativeIndex)?;
    check_size(n)
}

fn check_size(size: u64) -> Result<usize, FunctionError> {
    match usize::try_from(size) {
        Ok(n) if n <= MAX_LAG_SIZE => Ok(n),
        _ => Err(FunctionError::SizeTooLarge {
            size,
            max: MAX_LAG_SIZE,
        }),
    }
}

/// The most recent non-null value for the key. Nulls never overwrite state.
pub fn latest(ctx: &mut dyn FunctionContext, args: &[Value]) -> ExecResult {
    let call = Invocation::split(args)?;
    if !(1..=2).contains(&call.params.len()) {
        return Err(FunctionError::Arity {
            expected: "one or two".to_string(),
            got: call.params.len(),
        });
    }
    let value = &call.params[0];
    if call.is_valid()? && !value.is_null() {
        put(ctx, call.key, value.clone())?;
        return Ok((value.clone(), true));
    }
    match get(ctx, call.key)? {
        Value::Null => Ok((call.params.get(1).cloned().unwrap_or_default(), true)),
        stored => Ok((stored, true)),
    }
}

fn validate_changed_col(args: &[ArgExpr]) -> Result<(), FunctionError> {
    validate_len(2, args.len())?;
    if args[0].is_non_bool_literal() {
        return Err(produce_err_info(0, "boolean"));
    }
    Ok(())
}

fn validate_had_changed(args: &[ArgExpr]) -> Result<(), FunctionError> {
    if args.len() <= 1 {
        return Err(FunctionError::Arity {
            expected: "more than one".to_string(),
            got: args.len(),
        });
    }
    if args[0].is_non_bool_literal() {
        return Err(produce_err_info(0, "bool"));
    }
    Ok(())
}

fn validate_lag(args: &[ArgExpr]) -> Result<(), FunctionError> {
    if !(1..=4).contains(&args.len()) {
        return Err(FunctionError::Arity {
            expected: "from 1 to 4".to_string(),
            got: args.len(),
        });
    }
    if let Some(size) = args.get(1) {
        if size.is_float() || size.is_time() || size.is_boolean() || size.is_string() || size.is_field_ref() {
            return Err(produce_err_info(1, "int"));
        }
        if let ArgExpr::Integer(n) = size {
            let n = u64::try_from(*n).map_err(|_| FunctionError::NegativeIndex)?;
            check_size(n)?;
        }
    }
    if let Some(flag) = args.get(3) {
        if flag.is_non_bool_literal() {
            return Err(produce_err_info(3, "bool"));
        }
    }
    Ok(())
}

fn validate_latest(args: &[ArgExpr]) -> Result<(), FunctionError> {
    if !(1..=2).contains(&args.len()) {
        return Err(FunctionError::Arity {
            expected: "one or two".to_string(),
            got: args.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::MemoryStateStore;
    use serde_json::json;

    fn args(params: &[Value], valid: bool, key: &str) -> Vec<Value> {
        let mut args = params.to_vec();
        args.push(json!(valid));
        args.push(json!(key));
        args
    }

    #[test]
    fn changed_col_emits_only_changes() {
        let mut ctx = MemoryStateStore::new();
        let call = args(&[json!(false), json!(5)], true, "k");
        assert_eq!(changed_col(&mut ctx, &call).unwrap(), (json!(5), true));
        assert_eq!(changed_col(&mut ctx, &call).unwrap(), (Value::Null, true));

        let call = args(&[json!(false), json!(6)], true, "k");
        assert_eq!(changed_col(&mut ctx, &call).unwrap(), (json!(6), true));
    }

    #[test]
    fn changed_col_ignored_and_invalid_rows_keep_state() {
        let mut ctx = MemoryStateStore::new();
        changed_col(&mut ctx, &args(&[json!(true), json!({"a": 1})], true, "k")).unwrap();

        let ignored = args(&[json!(true), Value::Null], true, "k");
        assert_eq!(changed_col(&mut ctx, &ignored).unwrap(), (Value::Null, true));
        let invalid = args(&[json!(true), json!(2)], false, "k");
        assert_eq!(changed_col(&mut ctx, &invalid).unwrap(), (Value::Null, true));

        assert_eq!(ctx.get_state("k").unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn changed_col_rejects_non_bool_flags() {
        let mut ctx = MemoryStateStore::new();
        let err = changed_col(&mut ctx, &args(&[json!(1), json!(5)], true, "k")).unwrap_err();
        assert_eq!(err.to_string(), "first arg is not a bool but got 1");

        let mut call = args(&[json!(false), json!(5)], true, "k");
        call[2] = json!("yes");
        let err = changed_col(&mut ctx, &call).unwrap_err();
        assert!(matches!(err, FunctionError::NotBool { position: "when", .. }));
        assert!(ctx.is_empty());
    }

    #[test]
    fn had_changed_tracks_each_position() {
        let mut ctx = MemoryStateStore::new();
        let first = args(&[json!(true), json!(1), json!(2)], true, "k");
        assert_eq!(had_changed(&mut ctx, &first).unwrap(), (json!(true), true));
        assert_eq!(had_changed(&mut ctx, &first).unwrap(), (json!(false), true));

        let second = args(&[json!(true), json!(1), json!(3)], true, "k");
        assert_eq!(had_changed(&mut ctx, &second).unwrap(), (json!(true), true));
        assert_eq!(ctx.get_state("k1").unwrap(), Some(json!(1)));
        assert_eq!(ctx.get_state("k2").unwrap(), Some(json!(3)));
    }

    #[test]
    fn had_changed_skips_nulls_and_invalid_rows() {
        let mut ctx = MemoryStateStore::new();
        had_changed(&mut ctx, &args(&[json!(true), json!(1), json!(2)], true, "k")).unwrap();

        let nulls = args(&[json!(true), Value::Null, json!(2)], true, "k");
        assert_eq!(had_changed(&mut ctx, &nulls).unwrap(), (json!(false), true));

        let invalid = args(&[json!(true), json!(9), json!(9)], false, "k");
        assert_eq!(had_changed(&mut ctx, &invalid).unwrap(), (json!(false), true));
        assert_eq!(ctx.get_state("k1").unwrap(), Some(json!(1)));

        let short = args(&[json!(true)], true, "k");
        assert!(matches!(had_changed(&mut ctx, &short), Err(FunctionError::Arity { .. })));
    }

    #[test]
    fn lag_warms_up_from_default() {
        let mut ctx = MemoryStateStore::new();
        let results: Vec<Value> = [10, 20, 30]
            .iter()
            .map(|v| lag(&mut ctx, &args(&[json!(v), json!(2), json!(0)], true, "k")).unwrap().0)
            .collect();
        assert_eq!(results, vec![json!(0), json!(0), json!(10)]);
    }

    #[test]
    fn lag_holds_on_invalid_and_null_rows() {
        let mut ctx = MemoryStateStore::new();
        assert_eq!(lag(&mut ctx, &args(&[json!("a")], true, "k")).unwrap(), (Value::Null, true));
        assert_eq!(lag(&mut ctx, &args(&[json!("b")], false, "k")).unwrap(), (json!("a"), true));
        assert_eq!(lag(&mut ctx, &args(&[Value::Null], true, "k")).unwrap(), (json!("a"), true));

        // ignoreNull=false lets null advance the buffer
        let keep_null = args(&[Value::Null, json!(1), Value::Null, json!(false)], true, "k");
        assert_eq!(lag(&mut ctx, &keep_null).unwrap(), (json!("a"), true));
        assert_eq!(lag(&mut ctx, &args(&[json!("c")], true, "k")).unwrap(), (Value::Null, true));
    }

    #[test]
    fn lag_partitions_by_key() {
        let mut ctx = MemoryStateStore::new();
        lag(&mut ctx, &args(&[json!(1)], true, "a")).unwrap();
        lag(&mut ctx, &args(&[json!(2)], true, "b")).unwrap();
        assert_eq!(lag(&mut ctx, &args(&[json!(3)], true, "a")).unwrap().0, json!(1));
        assert_eq!(lag(&mut ctx, &args(&[json!(4)], true, "b")).unwrap().0, json!(2));
    }

    #[test]
    fn lag_argument_errors() {
        let mut ctx = MemoryStateStore::new();
        let err = lag(&mut ctx, &args(&[json!(1), json!(1.5)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::NotInteger { .. }));
        let err = lag(&mut ctx, &args(&[json!(1), json!(-1)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::NegativeIndex));
        let err = lag(&mut ctx, &args(&[json!(1), json!(1), json!(0), json!(3)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::NotBool { position: "fourth", .. }));
        let err = lag(&mut ctx, &args(&[], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::Arity { .. }));

        ctx.put_state("k", json!("garbage")).unwrap();
        let err = lag(&mut ctx, &args(&[json!(1)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::CorruptState { .. }));
    }

    #[test]
    fn lag_rejects_oversized_lookback() {
        let mut ctx = MemoryStateStore::new();
        let err = lag(&mut ctx, &args(&[json!(1), json!(i64::MAX), json!(0)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::SizeTooLarge { max: MAX_LAG_SIZE, .. }));
        let too_big = json!(MAX_LAG_SIZE as u64 + 1);
        assert!(lag(&mut ctx, &args(&[json!(1), too_big], true, "k")).is_err());
        assert!(ctx.is_empty());

        let at_limit = json!(MAX_LAG_SIZE as u64);
        assert_eq!(lag(&mut ctx, &args(&[json!(1), at_limit], true, "k")).unwrap(), (Value::Null, true));
    }

    #[test]
    fn lag_first_invalid_row_seeds_buffer_with_default() {
        let mut ctx = MemoryStateStore::new();
        let first = args(&[json!(10), json!(2), json!("none")], false, "k");
        assert_eq!(lag(&mut ctx, &first).unwrap(), (json!("none"), true));

        let stored = ctx.get_state("k").unwrap().expect("buffer persisted");
        let queue = RingQueue::from_value(stored).unwrap();
        assert_eq!(queue.capacity(), 2);
        assert_eq!(queue.peek(), &json!("none"));

        let next = args(&[json!(20), json!(2), json!("none")], true, "k");
        assert_eq!(lag(&mut ctx, &next).unwrap(), (json!("none"), true));
    }

    #[test]
    fn had_changed_compares_composite_values_deeply() {
        let mut ctx = MemoryStateStore::new();
        let first = args(&[json!(false), json!({"a": [1, 2], "b": {"c": 1}}), json!([1, {"x": true}])], true, "k");
        assert_eq!(had_changed(&mut ctx, &first).unwrap(), (json!(true), true));

        let same = args(&[json!(false), json!({"b": {"c": 1}, "a": [1, 2]}), json!([1, {"x": true}])], true, "k");
        assert_eq!(had_changed(&mut ctx, &same).unwrap(), (json!(false), true));

        let nested_change = args(&[json!(false), json!({"a": [1, 2], "b": {"c": 2}}), json!([1, {"x": true}])], true, "k");
        assert_eq!(had_changed(&mut ctx, &nested_change).unwrap(), (json!(true), true));

        let reordered = args(&[json!(false), json!({"a": [1, 2], "b": {"c": 2}}), json!([{"x": true}, 1])], true, "k");
        assert_eq!(had_changed(&mut ctx, &reordered).unwrap(), (json!(true), true));
        assert_eq!(ctx.get_state("k2").unwrap(), Some(json!([{"x": true}, 1])));
    }

    #[test]
    fn lag_zero_size_acts_as_single_step() {
        let mut ctx = MemoryStateStore::new();
        lag(&mut ctx, &args(&[json!(1), json!(0)], true, "k")).unwrap();
        assert_eq!(lag(&mut ctx, &args(&[json!(2), json!(0)], true, "k")).unwrap().0, json!(1));
    }

    #[test]
    fn latest_keeps_last_non_null() {
        let mut ctx = MemoryStateStore::new();
        assert_eq!(latest(&mut ctx, &args(&[Value::Null, json!(99)], true, "k")).unwrap(), (json!(99), true));
        assert_eq!(latest(&mut ctx, &args(&[json!(7)], true, "k")).unwrap(), (json!(7), true));
        assert_eq!(latest(&mut ctx, &args(&[Value::Null], false, "k")).unwrap(), (json!(7), true));
        assert_eq!(latest(&mut ctx, &args(&[json!(8)], false, "k")).unwrap(), (json!(7), true));
    }

    #[test]
    fn latest_without_default_yields_null() {
        let mut ctx = MemoryStateStore::new();
        assert_eq!(latest(&mut ctx, &args(&[Value::Null], true, "k")).unwrap(), (Value::Null, true));
        let err = latest(&mut ctx, &args(&[json!(1), json!(2), json!(3)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::Arity { .. }));
    }

    #[test]
    fn state_failures_surface_as_errors() {
        let mut ctx = MemoryStateStore::new();
        ctx.clear();
        let err = latest(&mut ctx, &args(&[json!(1)], true, "k")).unwrap_err();
        assert_eq!(err.to_string(), "error setting state for k: state store is closed");
        let err = lag(&mut ctx, &args(&[json!(1)], true, "k")).unwrap_err();
        assert!(matches!(err, FunctionError::State { op: "getting", .. }));
    }

    #[test]
    fn non_string_key_is_rejected() {
        let mut ctx = MemoryStateStore::new();
        let err = latest(&mut ctx, &[json!(1), json!(true), json!(3)]).unwrap_err();
        assert!(matches!(err, FunctionError::BadKey(_)));
    }

    #[test]
    fn validators_reject_literal_shapes() {
        use ArgExpr::*;
        let field = || FieldRef("a".to_string());

        assert!(validate_changed_col(&[Boolean(true), field()]).is_ok());
        assert!(validate_changed_col(&[field(), field()]).is_ok());
        for bad in [Integer(1), Float(1.0), String("x".into()), Time("now".into())] {
            assert_eq!(
                validate_changed_col(&[bad, field()]).unwrap_err().to_string(),
                "Expect boolean type for parameter 1"
            );
        }
        assert!(validate_changed_col(&[Boolean(true)]).is_err());

        assert!(validate_had_changed(&[Boolean(true), field(), field()]).is_ok());
        assert!(validate_had_changed(&[Boolean(true)]).is_err());
        assert!(validate_had_changed(&[String("x".into()), field()]).is_err());

        assert!(validate_lag(&[field()]).is_ok());
        assert!(validate_lag(&[field(), Integer(3), Integer(0), Boolean(false)]).is_ok());
        assert!(validate_lag(&[field(), Call("size".into())]).is_ok());
        assert!(matches!(validate_lag(&[field(), Integer(-1)]), Err(FunctionError::NegativeIndex)));
        assert!(matches!(
            validate_lag(&[field(), Integer(i64::MAX)]),
            Err(FunctionError::SizeTooLarge { .. })
        ));
        assert!(validate_lag(&[field(), Integer(MAX_LAG_SIZE as i64)]).is_ok());
        for bad in [Float(1.0), Boolean(true), String("1".into()), field(), Time("t".into())] {
            assert_eq!(
                validate_lag(&[field(), bad]).unwrap_err().to_string(),
                "Expect int type for parameter 2"
            );
        }
        assert!(validate_lag(&[field(), Integer(1), Integer(0), Integer(1)]).is_err());
        assert!(validate_lag(&[]).is_err());

        assert!(validate_latest(&[field(), Integer(0)]).is_ok());
        assert!(validate_latest(&[field(), Integer(0), Integer(0)]).is_err());
    }
}
