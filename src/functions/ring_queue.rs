// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fixed-capacity circular buffer backing the `lag` lookback.

use serde::{Deserialize, Serialize};

use crate::model::Value;

/// A circular buffer of exactly `capacity` slots.
///
/// `head` always points at the oldest slot, which is also the slot the next
/// `append` overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingQueue {
    slots: Vec<Value>,
    head: usize,
}

impl RingQueue {
    /// A queue with `capacity` empty slots. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Value::Null; capacity.max(1)],
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn fill(&mut self, value: &Value) {
        for slot in self.slots.iter_mut() {
            *slot = value.clone();
        }
    }

    /// Insert `value` as the newest element and return the evicted oldest.
    pub fn append(&mut self, value: Value) -> Value {
        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.slots.len();
        evicted
    }

    pub fn peek(&self) -> &Value {
        &self.slots[self.head]
    }

    /// Take the value the next `append` would evict, leaving its slot empty.
    pub fn fetch(&mut self) -> Value {
        std::mem::take(&mut self.slots[self.head])
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Restore a queue persisted with [`RingQueue::to_value`].
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let queue: RingQueue = serde_json::from_value(value)?;
        if queue.slots.is_empty() || queue.head >= queue.slots.len() {
            return Err(serde::de::Error::custom(format!(
                "ring queue head {} out of range for {} slots",
                queue.head,
                queue.slots.len()
            )));
        }
        Ok(queue)
    }
}
