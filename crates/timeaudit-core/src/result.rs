//! Audit result types.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::{TaskRecord, format_datetime};

/// Per-user lists, keyed in first-seen user order.
pub type PerUser<T> = IndexMap<String, Vec<T>>;

/// One user's rollup: date -> entries.
pub type UserRollup = IndexMap<String, Vec<RollupEntry>>;

/// Full rollup: user -> date -> entries.
pub type Rollup = IndexMap<String, UserRollup>;

/// Two chronologically adjacent tasks of one user whose intervals intersect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapPair {
    /// Span of the earlier task.
    #[serde(rename = "task1 start-end")]
    pub first_span: String,
    /// Span of the later task.
    #[serde(rename = "task2 start-end")]
    pub second_span: String,
    /// Description of the earlier task.
    #[serde(rename = "task1")]
    pub first: String,
    /// Description of the later task.
    #[serde(rename = "task2")]
    pub second: String,
}

impl OverlapPair {
    /// Build a pair from two records, `first` starting no later than `second`.
    pub fn between(first: &TaskRecord, second: &TaskRecord) -> Self {
        Self {
            first_span: first.span_label(),
            second_span: second.span_label(),
            first: first.description.clone(),
            second: second.description.clone(),
        }
    }
}

/// A task flagged as suspiciously short or long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedTask {
    /// Task description.
    pub task: String,
    /// Start instant.
    pub datetime: String,
    /// Logged duration in decimal hours.
    pub duration: Decimal,
}

impl From<&TaskRecord> for FlaggedTask {
    fn from(record: &TaskRecord) -> Self {
        Self {
            task: record.description.clone(),
            datetime: format_datetime(&record.start),
            duration: record.duration,
        }
    }
}

/// Summed time for one (user, date, description) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupEntry {
    pub description: String,
    /// Exact decimal sum of the durations.
    pub duration: Decimal,
    /// `"Xh Ym"` rendering of `duration`.
    pub duration_hm: String,
}

/// Aggregate time totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStats {
    pub total_time: Decimal,
    pub time_per_user: IndexMap<String, Decimal>,
}

/// A persisted per-user report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
    pub user: String,
    pub filename: String,
    /// Path relative to the output base, including the run directory.
    pub relative_path: String,
}

/// Everything one audit produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub overlap_per_user: PerUser<OverlapPair>,
    pub time_stats: TimeStats,
    pub small_tasks_per_user: PerUser<FlaggedTask>,
    pub big_tasks_per_user: PerUser<FlaggedTask>,
    pub report_by_user_by_date: Rollup,
    /// Threshold the big-task list was computed with.
    pub big_task_hours: f64,
    /// Empty unless reports were persisted.
    #[serde(default)]
    pub report_files: Vec<ReportFile>,
    /// Run directory name, when reports were persisted.
    #[serde(default)]
    pub run_dir: Option<String>,
}

impl AuditResult {
    /// Number of overlaps across all users.
    pub fn overlap_count(&self) -> usize {
        self.overlap_per_user.values().map(Vec::len).sum()
    }

    /// Whether the result has been persisted.
    pub fn is_persisted(&self) -> bool {
        self.run_dir.is_some()
    }
}
