//! Profile slot reads used by the ordering flow.
//!
//! Both reads are fail-soft: storage errors and malformed values fall back to
//! the guest defaults.

use crate::store::{KvStore, SLOT_CURRENT_USER, SLOT_USER_ADDRESS};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// Greeting name used when nobody is signed in.
pub const GUEST_NAME: &str = "Guest";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUser {
    username: String,
    #[serde(default)]
    logged_in: bool,
}

/// Read-only view over the profile slots.
pub struct ProfileService<S: KvStore> {
    store: S,
}

impl<S: KvStore> ProfileService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Username of the signed-in user, or `Guest`.
    pub fn display_name(&self) -> String {
        let raw = match self.store.get(SLOT_CURRENT_USER) {
            Ok(Some(value)) => value,
            Ok(None) => return GUEST_NAME.to_string(),
            Err(err) => {
                warn!("event=slot_read module=profile status=error slot={SLOT_CURRENT_USER} error={err}");
                return GUEST_NAME.to_string();
            }
        };

        match serde_json::from_value::<CurrentUser>(raw) {
            Ok(user) if user.logged_in && !user.username.trim().is_empty() => user.username,
            Ok(_) => GUEST_NAME.to_string(),
            Err(err) => {
                warn!("event=slot_read module=profile status=skip slot={SLOT_CURRENT_USER} error={err}");
                GUEST_NAME.to_string()
            }
        }
    }

    /// Address saved by the last successful checkout, or an empty string.
    pub fn saved_address(&self) -> String {
        match self.store.get(SLOT_USER_ADDRESS) {
            Ok(Some(Value::String(address))) => address,
            Ok(_) => String::new(),
            Err(err) => {
                warn!("event=slot_read module=profile status=error slot={SLOT_USER_ADDRESS} error={err}");
                String::new()
            }
        }
    }
}
