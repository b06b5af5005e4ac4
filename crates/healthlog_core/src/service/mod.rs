//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from SQL and row decoding.

pub mod export;
pub mod goal_service;
pub mod import_service;
pub mod medication_service;
pub mod metric_service;
pub mod report_service;
