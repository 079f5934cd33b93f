//! Key-value slot storage contract.
//!
//! # Responsibility
//! - Define the `get`/`set`/`append` capability every lifecycle component
//!   receives explicitly.
//! - Name the slots the lifecycle core reads and writes.
//!
//! # Invariants
//! - `get` on a slot that was never written returns `Ok(None)`.
//! - `set` fully replaces the previous slot value.
//! - `append` treats an absent or non-list slot as an empty list.

use crate::db::DbError;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteKvStore;

/// Live basket entries (list of load items).
pub const SLOT_BASKET: &str = "basket";
/// Placed orders (list of orders).
pub const SLOT_ORDERS: &str = "orders";
/// Signed-in user profile (`{username, loggedIn}`).
pub const SLOT_CURRENT_USER: &str = "currentUser";
/// Last address used at checkout.
pub const SLOT_USER_ADDRESS: &str = "userAddress";
/// Last in-progress configurator choice. Informational only.
pub const SLOT_SERVICE_SELECTION: &str = "serviceSelection";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by a storage backend.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Stored text for `key` could not be decoded, or a value could not be encoded.
    Serialization {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization { key, source } => {
                write!(f, "invalid JSON in slot `{key}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Slot-addressed JSON storage.
pub trait KvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Appends `item` to the list stored at `key`.
    fn append(&self, key: &str, item: Value) -> StoreResult<()> {
        let mut list = match self.get(key)? {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        list.push(item);
        self.set(key, &Value::Array(list))
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn append(&self, key: &str, item: Value) -> StoreResult<()> {
        (**self).append(key, item)
    }
}

/// Reads a list slot, mapping absence, non-list values and read errors to an
/// empty list.
///
/// Read failures are logged and never surfaced.
pub(crate) fn read_list_soft(store: &impl KvStore, key: &str, module: &str) -> Vec<Value> {
    match store.get(key) {
        Ok(Some(Value::Array(items))) => items,
        Ok(None) => Vec::new(),
        Ok(Some(other)) => {
            log::warn!(
                "event=slot_read module={module} status=skip slot={key} reason=not_a_list kind={}",
                json_kind(&other)
            );
            Vec::new()
        }
        Err(err) => {
            log::warn!(
                "event=slot_read module={module} status=error slot={key} error={err}"
            );
            Vec::new()
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{read_list_soft, KvStore, MemoryStore};
    use serde_json::json;

    #[test]
    fn append_starts_a_list_when_slot_is_absent() {
        let store = MemoryStore::new();
        store.append("orders", json!({"orderId": "a"})).unwrap();
        store.append("orders", json!({"orderId": "b"})).unwrap();

        let stored = store.get("orders").unwrap().unwrap();
        assert_eq!(stored, json!([{"orderId": "a"}, {"orderId": "b"}]));
    }

    #[test]
    fn append_replaces_non_list_value() {
        let store = MemoryStore::new();
        store.set("basket", &json!("garbage")).unwrap();
        store.append("basket", json!(1)).unwrap();

        assert_eq!(store.get("basket").unwrap(), Some(json!([1])));
    }

    #[test]
    fn read_list_soft_maps_non_list_to_empty() {
        let store = MemoryStore::new();
        store.set("basket", &json!({"not": "a list"})).unwrap();

        assert!(read_list_soft(&store, "basket", "test").is_empty());
        assert!(read_list_soft(&store, "missing", "test").is_empty());
    }
}
