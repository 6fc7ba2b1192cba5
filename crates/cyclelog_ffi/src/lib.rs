//! Flutter-facing bindings for the cycle ledger core.

pub mod api;
