//! Core types and traits for timeaudit.
//!
//! This crate provides the fundamental data structures shared by the
//! timeaudit crates: parsed task records, audit result types, configuration,
//! errors, and the clock abstraction used for run-directory naming and
//! retention.

mod clock;
mod config;
mod error;
mod record;
mod result;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    AuditConfig, AuditConfigBuilder, DEFAULT_BIG_TASK_HOURS, DEFAULT_OUTPUT_DIR,
    DEFAULT_RETENTION_HOURS,
};
pub use error::AuditError;
pub use record::{DATETIME_FORMAT, TaskRecord, format_datetime};
pub use result::{
    AuditResult, FlaggedTask, OverlapPair, PerUser, ReportFile, Rollup, RollupEntry, TimeStats,
    UserRollup,
};

pub use rust_decimal::Decimal;
