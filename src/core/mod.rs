//! Core business logic - framework-agnostic grade, attendance and fee operations.
//!
//! Pure computations (`evaluate`, `aggregate_gpa`, `compute_stats`, `derive_status`,
//! `apply_payment`, `summarize`) take explicit values and never touch the database.
//! The async functions around them read, compute derived fields, and write one record.

pub mod attendance;
pub mod fee;
pub mod grade;
pub mod maintenance;
pub mod report;
pub mod subject;
