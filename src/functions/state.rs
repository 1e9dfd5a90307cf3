// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::errors::StateError;
use crate::model::Value;
use crate::traits::FunctionContext;

/// In-memory per-rule state for analytic functions.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: HashMap<String, Value>,
    closed: bool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop all state and refuse further access. Called when the rule is
    /// disposed.
    pub fn clear(&mut self) {
        self.values.clear();
        self.closed = true;
    }
}

impl FunctionContext for MemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<Value>, StateError> {
        if self.closed {
            return Err(StateError::Closed);
        }
        Ok(self.values.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Value) -> Result<(), StateError> {
        if self.closed {
            return Err(StateError::Closed);
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_clears() {
        let mut store = MemoryStateStore::new();
        assert_eq!(store.get_state("k").unwrap(), None);
        store.put_state("k", json!([1, 2])).unwrap();
        assert_eq!(store.get_state("k").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
        assert!(matches!(store.get_state("k"), Err(StateError::Closed)));
        assert!(matches!(store.put_state("k", json!(1)), Err(StateError::Closed)));
    }
}
