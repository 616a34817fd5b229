//! Audit algorithms for timeaudit.
//!
//! This crate turns a time-tracking export into an [`AuditResult`]:
//!
//! - **Parsing** - CSV rows to [`TaskRecord`]s, day-first dates
//! - **Overlaps** - neighbouring tasks of one user whose intervals intersect
//! - **Outliers** - tasks shorter than 0.01h or longer than a threshold
//! - **Rollup** - exact time totals per user and per (user, date, description)
//!
//! Overlap detection and classification walk each user's tasks in start
//! order, pairwise, so the last task of a user is never classified.
//!
//! ```rust,ignore
//! use timeaudit_analyze::TimeAuditor;
//! use timeaudit_core::AuditConfig;
//!
//! let config = AuditConfig::builder().big_task_hours(6.0).build().unwrap();
//! let result = TimeAuditor::new(config).run(&csv)?;
//!
//! for (user, overlaps) in &result.overlap_per_user {
//!     println!("{user}: {} overlaps", overlaps.len());
//! }
//! ```

mod audit;
mod classify;
mod overlap;
pub mod parse;
mod rollup;
mod timeline;

pub use audit::TimeAuditor;
pub use classify::{Classification, classify_tasks, small_task_threshold};
pub use overlap::detect_overlaps;
pub use parse::{REQUIRED_COLUMNS, parse_records, parse_records_bytes};
pub use rollup::{Aggregation, aggregate, format_hm};
pub use timeline::{Timeline, user_timelines};

// Re-export core types
pub use timeaudit_core::{AuditConfig, AuditError, AuditResult, TaskRecord};
