//! Domain model for basket loads and placed orders.
//!
//! # Responsibility
//! - Define canonical records shared by configurator, basket and order flows.
//! - Own the read-boundary normalization from loosely shaped stored JSON.
//!
//! # Invariants
//! - Derived view state (group checks, totals) is never part of a record.
//! - Every record read from storage passes through a normalizer first.

pub mod catalog;
pub mod load_item;
pub mod order;
