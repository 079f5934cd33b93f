use super::{KvStore, StoreResult};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-process slot store.
///
/// Used by tests and previews; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots that currently hold a value.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
