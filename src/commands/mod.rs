//! Command implementations

pub mod grade;

pub use grade::{handle_grade_command, AuditSummary};
