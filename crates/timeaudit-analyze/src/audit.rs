//! Audit orchestration.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, info};

use timeaudit_core::{AuditConfig, AuditError, AuditResult, Clock, SystemClock, TaskRecord};
use timeaudit_report::ReportWriter;

use crate::classify::classify_tasks;
use crate::overlap::detect_overlaps;
use crate::parse::{parse_records, parse_records_bytes};
use crate::rollup::aggregate;

/// Runs complete audits over exports.
///
/// Parsing and computation touch no filesystem; reports are persisted only
/// when [`AuditConfig::write_reports`] is set, and only after everything
/// else has succeeded.
#[derive(Debug, Clone)]
pub struct TimeAuditor {
    config: AuditConfig,
    clock: Arc<dyn Clock>,
}

impl TimeAuditor {
    /// Create an auditor using the system clock.
    pub fn new(config: AuditConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an auditor with an explicit time source.
    pub fn with_clock(config: AuditConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Configuration in use.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audit CSV text.
    pub fn run(&self, content: &str) -> Result<AuditResult, AuditError> {
        self.config.validate()?;
        let records = parse_records(content)?;
        self.finish(&records)
    }

    /// Audit raw uploaded bytes, which must be UTF-8.
    pub fn run_bytes(&self, bytes: &[u8]) -> Result<AuditResult, AuditError> {
        self.config.validate()?;
        let records = parse_records_bytes(bytes)?;
        self.finish(&records)
    }

    /// Compute the audit for already-parsed records without persisting.
    pub fn compute(&self, records: &[TaskRecord]) -> Result<AuditResult, AuditError> {
        let threshold = self.big_task_threshold()?;

        let overlap_per_user = detect_overlaps(records);
        let classification = classify_tasks(records, threshold);
        let aggregation = aggregate(records)?;

        debug!(
            records = records.len(),
            users = aggregation.time_stats.time_per_user.len(),
            "computed audit"
        );

        Ok(AuditResult {
            overlap_per_user,
            time_stats: aggregation.time_stats,
            small_tasks_per_user: classification.small,
            big_tasks_per_user: classification.big,
            report_by_user_by_date: aggregation.rollup,
            big_task_hours: self.config.big_task_hours,
            report_files: Vec::new(),
            run_dir: None,
        })
    }

    fn finish(&self, records: &[TaskRecord]) -> Result<AuditResult, AuditError> {
        let mut result = self.compute(records)?;

        if self.config.write_reports {
            let writer = ReportWriter::with_clock(&self.config.output_dir, Arc::clone(&self.clock));
            let outcome =
                writer.persist(&result.report_by_user_by_date, self.config.retention_hours)?;
            result.report_files = outcome.files;
            result.run_dir = Some(outcome.run_dir.name);
        }

        info!(
            records = records.len(),
            overlaps = result.overlap_count(),
            persisted = result.is_persisted(),
            "audit complete"
        );
        Ok(result)
    }

    /// The big-task threshold as a decimal.
    ///
    /// Finite values beyond the decimal range are clamped to its bounds, and
    /// values too small to represent become zero.
    fn big_task_threshold(&self) -> Result<Decimal, AuditError> {
        let hours = self.config.big_task_hours;
        if !hours.is_finite() {
            return Err(AuditError::InvalidConfig {
                message: format!("big_task_hours must be finite, got {hours}"),
            });
        }
        Ok(Decimal::from_f64(hours).unwrap_or_else(|| {
            if hours.abs() < 1.0 {
                Decimal::ZERO
            } else if hours > 0.0 {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        }))
    }
}

impl Default for TimeAuditor {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}
