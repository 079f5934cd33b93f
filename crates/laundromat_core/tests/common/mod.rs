#![allow(dead_code)]

use laundromat_core::db::DbError;
use laundromat_core::{KvStore, MemoryStore, StoreError, StoreResult};
use serde_json::Value;
use std::cell::RefCell;

/// Memory store that rejects writes to one slot on demand.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_key: RefCell<Option<&'static str>>,
}

impl FlakyStore {
    pub fn fail_writes_to(&self, key: &'static str) {
        *self.failing_key.borrow_mut() = Some(key);
    }

    pub fn heal(&self) {
        *self.failing_key.borrow_mut() = None;
    }
}

impl KvStore for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        if *self.failing_key.borrow() == Some(key) {
            return Err(StoreError::Db(DbError::UnsupportedSchemaVersion {
                db_version: 0,
                latest_supported: 0,
            }));
        }
        self.inner.set(key, value)
    }
}
