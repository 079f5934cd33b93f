//! Flutter-facing bindings for the laundromat core.

pub mod api;
