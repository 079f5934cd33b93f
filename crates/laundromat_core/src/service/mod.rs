//! Ordering use-case services.
//!
//! # Responsibility
//! - Orchestrate slot reads/writes into configurator, basket and order flows.
//! - Keep UI/FFI layers decoupled from storage details.
//!
//! # Invariants
//! - Services receive their store and clock explicitly; none reach for a
//!   global.

pub mod basket_service;
pub mod configurator;
pub mod order_service;
pub mod profile_service;
pub mod refresh;
pub mod schedule;
