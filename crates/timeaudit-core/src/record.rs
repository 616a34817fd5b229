//! Parsed time entries.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed-width rendering used for every instant in audit output.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an instant with [`DATETIME_FORMAT`].
pub fn format_datetime(at: &NaiveDateTime) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

/// One logged task from the export.
///
/// `duration` comes straight from the export's decimal column and is never
/// reconciled with `end - start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// User who logged the task.
    pub user: String,
    /// Start instant (naive local time).
    pub start: NaiveDateTime,
    /// End instant (naive local time).
    pub end: NaiveDateTime,
    /// Start date exactly as written in the export; rollup key.
    pub start_date: String,
    /// Free-text task description.
    pub description: String,
    /// Logged duration in decimal hours.
    pub duration: Decimal,
}

impl TaskRecord {
    /// `"<start> - <end>"` using [`DATETIME_FORMAT`].
    pub fn span_label(&self) -> String {
        format!(
            "{} - {}",
            format_datetime(&self.start),
            format_datetime(&self.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_span_label() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let record = TaskRecord {
            user: "Alice".to_string(),
            start: day.and_hms_opt(9, 0, 0).unwrap(),
            end: day.and_hms_opt(10, 30, 5).unwrap(),
            start_date: "18/10/2026".to_string(),
            description: "Review".to_string(),
            duration: Decimal::new(15, 1),
        };
        assert_eq!(
            record.span_label(),
            "2026-10-18 09:00:00 - 2026-10-18 10:30:05"
        );
    }
}
