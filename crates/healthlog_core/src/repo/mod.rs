//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for medications,
//!   metrics and goals.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Write paths validate through the model before persistence.
//! - Repositories return semantic errors (`NotFound`, `Validation`) in
//!   addition to transport errors.
//! - Every write is committed before the call returns.

pub mod error;
pub mod goal_repo;
pub mod medication_repo;
pub mod metric_repo;
pub mod people;
mod readiness;
