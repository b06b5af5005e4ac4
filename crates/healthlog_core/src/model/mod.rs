//! Health record domain model.
//!
//! # Responsibility
//! - Define the typed records owned by the store (medications, metrics, goals).
//! - Hold validation rules so every write path shares one definition.
//!
//! # Invariants
//! - Records are identified by store-assigned UUIDs.
//! - Loosely typed input never reaches repositories; it is coerced here or
//!   rejected with `ValidationError`.

pub mod datetime;
pub mod goal;
pub mod medication;
pub mod metric;
pub mod validation;
