//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, conflict detection and repository calls into
//!   use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod schedule_service;
