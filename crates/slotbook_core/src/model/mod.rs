//! Domain model for the scheduling roster.
//!
//! # Responsibility
//! - Define canonical participant and appointment records.
//! - Own input validation rules shared by services and adapters.
//!
//! # Invariants
//! - Every record is identified by a stable integer id.
//! - The multi-participant appointment is the only canonical shape.

pub mod appointment;
pub mod participant;
