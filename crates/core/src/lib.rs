//! # Slotwise Core
//!
//! Domain types and pure scheduling logic for the Slotwise booking service.
//! Everything in this crate is independent of storage and transport: the slot
//! generator and conflict resolver operate on plain values so they can be
//! exercised deterministically in tests, while the API and scheduler crates
//! supply the database rows and wall-clock time at the edges.

/// Clock abstraction so time-dependent logic stays testable
pub mod clock;
/// Domain error types shared across the service
pub mod errors;
/// Domain models and request/response types
pub mod models;
/// Slot generation and conflict resolution
pub mod scheduling;
/// Lifecycle signal types and the in-process signal bus
pub mod signals;
