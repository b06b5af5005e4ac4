//! Insight and summary engine.
//!
//! # Responsibility
//! - Aggregate metrics into windowed summaries and weekly rollups.
//! - Evaluate goal progress and medication adherence.
//! - Assemble the structured report model.
//!
//! # Invariants
//! - All functions are pure over records passed in by the caller.
//! - Empty input produces zero/absent values, never an error.

pub mod adherence;
pub mod advice;
pub mod goal_progress;
pub mod report;
pub mod summary;
