//! Flutter-facing bindings for the Slotbook scheduling core.

pub mod api;
