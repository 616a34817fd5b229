//! Per-user report persistence.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use timeaudit_core::{AuditError, Clock, ReportFile, Rollup, SystemClock};

use crate::retention::{SweepReport, sweep_expired};
use crate::run_dir::{RunDirectory, random_suffix, run_dir_name};

/// Suffix appended to every per-user report file.
pub const REPORT_FILE_SUFFIX: &str = "_report.json";

/// Filesystem-safe form of a user name: lowercase, spaces and path
/// separators replaced by `_`.
pub fn safe_user_name(user: &str) -> String {
    user.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Report file name for a user.
pub fn report_filename(user: &str) -> String {
    format!("{}{REPORT_FILE_SUFFIX}", safe_user_name(user))
}

/// Result of a full persistence step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistOutcome {
    pub run_dir: RunDirectory,
    pub files: Vec<ReportFile>,
    pub sweep: SweepReport,
}

/// Writes rollups into isolated run directories under a base location.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    base: PathBuf,
    clock: Arc<dyn Clock>,
}

impl ReportWriter {
    /// Create a writer using the system clock.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self::with_clock(base, Arc::new(SystemClock))
    }

    /// Create a writer with an explicit time source.
    pub fn with_clock(base: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            base: base.into(),
            clock,
        }
    }

    /// Base output location.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Create the base location if absent.
    pub fn ensure_base(&self) -> Result<(), AuditError> {
        fs::create_dir_all(&self.base).map_err(|e| AuditError::io(&self.base, e))
    }

    /// Remove run directories older than `retention_hours`.
    pub fn sweep_expired(&self, retention_hours: u32) -> Result<SweepReport, AuditError> {
        sweep_expired(&self.base, self.clock.now(), retention_hours)
    }

    /// Create a fresh, uniquely named run directory.
    pub fn create_run_dir(&self) -> Result<RunDirectory, AuditError> {
        let name = run_dir_name(self.clock.now(), &random_suffix());
        let path = self.base.join(&name);
        fs::create_dir(&path).map_err(|e| AuditError::io(&path, e))?;
        info!(run_dir = %name, "created run directory");
        Ok(RunDirectory { name, path })
    }

    /// Write one pretty-printed JSON file per user into `run`.
    ///
    /// Every report is encoded before the first file is written. If a write
    /// fails, the run directory is removed so no partial run is left behind.
    pub fn write_user_reports(
        &self,
        run: &RunDirectory,
        rollup: &Rollup,
    ) -> Result<Vec<ReportFile>, AuditError> {
        let encoded = encode_reports(rollup)?;
        self.write_encoded(run, encoded)
    }

    /// Ensure the base, sweep expired runs, then write `rollup` into a new run.
    ///
    /// Reports are encoded and checked for name collisions before the
    /// filesystem is touched.
    pub fn persist(
        &self,
        rollup: &Rollup,
        retention_hours: u32,
    ) -> Result<PersistOutcome, AuditError> {
        let encoded = encode_reports(rollup)?;

        self.ensure_base()?;
        let sweep = self.sweep_expired(retention_hours)?;
        let run_dir = self.create_run_dir()?;
        let files = self.write_encoded(&run_dir, encoded)?;
        info!(
            run_dir = %run_dir.name,
            reports = files.len(),
            "persisted audit reports"
        );
        Ok(PersistOutcome {
            run_dir,
            files,
            sweep,
        })
    }

    fn write_encoded(
        &self,
        run: &RunDirectory,
        encoded: Vec<EncodedReport>,
    ) -> Result<Vec<ReportFile>, AuditError> {
        let mut files = Vec::with_capacity(encoded.len());
        for report in encoded {
            let path = run.path.join(&report.filename);
            if let Err(e) = fs::write(&path, &report.text) {
                discard_run_dir(run);
                return Err(AuditError::io(&path, e));
            }
            debug!(user = %report.user, path = %path.display(), "wrote report");
            files.push(ReportFile {
                user: report.user,
                relative_path: format!("{}/{}", run.name, report.filename),
                filename: report.filename,
            });
        }

        Ok(files)
    }
}

/// One user's report, serialized and ready to write.
struct EncodedReport {
    user: String,
    filename: String,
    text: String,
}

/// Serialize every user's rollup, refusing users whose file names collide.
fn encode_reports(rollup: &Rollup) -> Result<Vec<EncodedReport>, AuditError> {
    let mut owners: HashMap<String, &str> = HashMap::with_capacity(rollup.len());
    let mut encoded = Vec::with_capacity(rollup.len());

    for (user, dates) in rollup {
        let filename = report_filename(user);
        if let Some(first) = owners.insert(filename.clone(), user.as_str()) {
            return Err(AuditError::ReportNameCollision {
                filename,
                first: first.to_string(),
                second: user.clone(),
            });
        }
        let text = to_pretty_json(dates).map_err(|e| AuditError::Serialize {
            path: PathBuf::from(&filename),
            message: e.to_string(),
        })?;
        encoded.push(EncodedReport {
            user: user.clone(),
            filename,
            text,
        });
    }

    Ok(encoded)
}

/// Best-effort removal of a run directory whose reports could not all be written.
fn discard_run_dir(run: &RunDirectory) {
    if let Err(e) = fs::remove_dir_all(&run.path) {
        warn!(run_dir = %run.name, error = %e, "failed to remove incomplete run directory");
    }
}

/// Pretty JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeaudit_core::UserRollup;

    #[test]
    fn test_safe_user_name() {
        assert_eq!(safe_user_name("Alice Smith"), "alice_smith");
        assert_eq!(safe_user_name("BOB"), "bob");
        assert_eq!(safe_user_name("ops/../root"), "ops_.._root");
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename("Jane Doe"), "jane_doe_report.json");
    }

    #[test]
    fn test_encode_uses_four_space_indent() {
        let mut dates = UserRollup::new();
        dates.insert("18/10/2026".to_string(), Vec::new());
        let text = to_pretty_json(&dates).unwrap();
        assert_eq!(text, "{\n    \"18/10/2026\": []\n}");
    }

    #[test]
    fn test_colliding_file_names_are_refused() {
        let mut rollup = Rollup::new();
        rollup.insert("Alice Smith".to_string(), UserRollup::new());
        rollup.insert("alice_smith".to_string(), UserRollup::new());

        let err = encode_reports(&rollup).err().unwrap();
        match err {
            AuditError::ReportNameCollision {
                filename,
                first,
                second,
            } => {
                assert_eq!(filename, "alice_smith_report.json");
                assert_eq!(first, "Alice Smith");
                assert_eq!(second, "alice_smith");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
