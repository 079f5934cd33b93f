//! Core ordering logic for Laundromat.
//! This crate is the single source of truth for basket and order invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::catalog::{Amount, DELIVERY_FEE};
pub use model::load_item::{ItemId, LoadItem, Segment};
pub use model::order::{FulfillmentType, Order, OrderId, OrderStatus};
pub use service::basket_service::{BasketError, BasketGroup, BasketResult, BasketService};
pub use service::configurator::{LoadConfigurator, LoadDraft};
pub use service::order_service::{
    CheckoutError, CheckoutRequest, CheckoutValidationError, OrderError, OrderResult,
    OrderService, StatusFilter,
};
pub use service::profile_service::ProfileService;
pub use service::refresh::RefreshTicker;
pub use store::{KvStore, MemoryStore, SqliteKvStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
