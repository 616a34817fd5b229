//! Time-based cleanup of old run directories.

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use timeaudit_core::AuditError;

use crate::run_dir::parse_run_timestamp;

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Expired run directories that were deleted.
    pub removed: Vec<String>,
    /// Directories whose names carry no run timestamp; never touched.
    pub skipped: Vec<String>,
    /// Expired directories that could not be deleted.
    pub failed: Vec<String>,
}

impl SweepReport {
    /// Whether anything was deleted.
    pub fn removed_any(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Delete run directories under `base` older than `retention_hours` at `now`.
///
/// A missing base is an empty sweep. Deletion failures are logged and
/// recorded in [`SweepReport::failed`], never returned. Concurrent sweeps of
/// the same base are not coordinated.
pub fn sweep_expired(
    base: &Path,
    now: DateTime<Utc>,
    retention_hours: u32,
) -> Result<SweepReport, AuditError> {
    let mut report = SweepReport::default();

    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(AuditError::io(base, e)),
    };

    let retention = TimeDelta::hours(i64::from(retention_hours));

    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(created_at) = parse_run_timestamp(&name) else {
            debug!(name = %name, "skipping directory without run timestamp");
            report.skipped.push(name);
            continue;
        };

        if now.signed_duration_since(created_at) <= retention {
            continue;
        }

        match fs::remove_dir_all(entry.path()) {
            Ok(()) => report.removed.push(name),
            Err(e) => {
                warn!(name = %name, error = %e, "failed to remove expired run directory");
                report.failed.push(name);
            }
        }
    }

    if report.removed_any() {
        info!(
            removed = report.removed.len(),
            base = %base.display(),
            "swept expired run directories"
        );
    }

    Ok(report)
}
