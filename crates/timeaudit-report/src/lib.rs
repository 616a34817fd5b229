//! Report persistence for timeaudit.
//!
//! Each persisting audit writes its per-user rollups into a fresh run
//! directory named `<YYYYMMDDTHHMMSSZ>_<6 hex chars>` under a base location.
//! Before the new directory is created, run directories older than the
//! retention window are deleted.
//!
//! ```rust,ignore
//! use timeaudit_report::ReportWriter;
//!
//! let writer = ReportWriter::new("output");
//! let outcome = writer.persist(&rollup, 24)?;
//! println!("wrote {} reports to {}", outcome.files.len(), outcome.run_dir.name);
//! ```
//!
//! Sweeping and creation are not atomic across processes; two audits racing
//! on the same base may both try to delete the same expired directory. The
//! loser's failure is logged and ignored.
//!
//! Report file names are derived from user names, so distinct users such as
//! `Alice Smith` and `alice smith` can map to the same file. Such a rollup is
//! refused with `AuditError::ReportNameCollision` before anything is written.

mod retention;
mod run_dir;
mod writer;

pub use retention::{SweepReport, sweep_expired};
pub use run_dir::{
    RUN_DIR_TIMESTAMP_FORMAT, RunDirectory, parse_run_timestamp, random_suffix, run_dir_name,
};
pub use writer::{
    PersistOutcome, REPORT_FILE_SUFFIX, ReportWriter, report_filename, safe_user_name,
    to_pretty_json,
};
