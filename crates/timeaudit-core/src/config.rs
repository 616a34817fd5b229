//! Audit configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// Default threshold above which a task counts as "big", in hours.
pub const DEFAULT_BIG_TASK_HOURS: f64 = 8.0;

/// Default base directory for persisted reports.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default age after which a run directory is swept, in hours.
pub const DEFAULT_RETENTION_HOURS: u32 = 24;

/// Configuration for one audit run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AuditConfig {
    /// Tasks longer than this many hours are reported as big.
    #[builder(default = "DEFAULT_BIG_TASK_HOURS")]
    #[serde(default = "default_big_task_hours")]
    pub big_task_hours: f64,

    /// Base directory holding run directories.
    #[builder(default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Persist per-user reports after computing the audit.
    #[builder(default = "false")]
    #[serde(default)]
    pub write_reports: bool,

    /// Run directories older than this are removed on the next persisting run.
    #[builder(default = "DEFAULT_RETENTION_HOURS")]
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u32,
}

fn default_big_task_hours() -> f64 {
    DEFAULT_BIG_TASK_HOURS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_retention_hours() -> u32 {
    DEFAULT_RETENTION_HOURS
}

impl AuditConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(hours) = self.big_task_hours {
            if !hours.is_finite() {
                return Err(format!("big_task_hours must be finite, got {hours}"));
            }
        }
        if let Some(ref dir) = self.output_dir {
            if dir.as_os_str().is_empty() {
                return Err("Output directory cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Create a new config builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Create a config that persists reports under `output_dir`.
    pub fn persisting(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_reports: true,
            ..Self::default()
        }
    }

    /// Check invariants of a config that may have been built by hand.
    pub fn validate(&self) -> Result<(), AuditError> {
        if !self.big_task_hours.is_finite() {
            return Err(AuditError::InvalidConfig {
                message: format!("big_task_hours must be finite, got {}", self.big_task_hours),
            });
        }
        if self.write_reports && self.output_dir.as_os_str().is_empty() {
            return Err(AuditError::InvalidConfig {
                message: "Output directory cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            big_task_hours: DEFAULT_BIG_TASK_HOURS,
            output_dir: default_output_dir(),
            write_reports: false,
            retention_hours: DEFAULT_RETENTION_HOURS,
        }
    }
}
