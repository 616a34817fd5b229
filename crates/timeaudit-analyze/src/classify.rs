//! Outlier classification of task durations.

use rust_decimal::Decimal;

use timeaudit_core::{FlaggedTask, PerUser, TaskRecord};

use crate::timeline::user_timelines;

/// Tasks shorter than this many hours are reported as small.
pub fn small_task_threshold() -> Decimal {
    Decimal::new(1, 2)
}

/// Small and big tasks per user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Tasks with `duration < 0.01`.
    pub small: PerUser<FlaggedTask>,
    /// Tasks with `duration > big_task_hours`.
    pub big: PerUser<FlaggedTask>,
}

/// Flag short and long tasks, walking each user's timeline in start order.
///
/// The last task of every timeline is never examined, matching the pairwise
/// walk used for overlap detection. With a threshold below 0.01 a task can
/// land in both lists.
pub fn classify_tasks(records: &[TaskRecord], big_task_hours: Decimal) -> Classification {
    let small_threshold = small_task_threshold();
    let mut classification = Classification::default();

    for (user, timeline) in user_timelines(records) {
        let examined = &timeline[..timeline.len().saturating_sub(1)];

        let small = examined
            .iter()
            .filter(|record| record.duration < small_threshold)
            .map(|record| FlaggedTask::from(*record))
            .collect();
        let big = examined
            .iter()
            .filter(|record| record.duration > big_task_hours)
            .map(|record| FlaggedTask::from(*record))
            .collect();

        classification.small.insert(user.to_string(), small);
        classification.big.insert(user.to_string(), big);
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(user: &str, description: &str, hour: u32, hours: &str) -> TaskRecord {
        let start = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        TaskRecord {
            user: user.to_string(),
            start,
            end: start,
            start_date: "18/10/2026".to_string(),
            description: description.to_string(),
            duration: hours.parse().unwrap(),
        }
    }

    #[test]
    fn test_small_and_big() {
        let records = vec![
            task("Alice", "blip", 8, "0.005"),
            task("Alice", "marathon", 9, "9.5"),
            task("Alice", "normal", 10, "2"),
            task("Alice", "last", 11, "0"),
        ];
        let classification = classify_tasks(&records, Decimal::from(8));

        let small: Vec<_> = classification.small["Alice"].iter().map(|t| t.task.as_str()).collect();
        let big: Vec<_> = classification.big["Alice"].iter().map(|t| t.task.as_str()).collect();
        assert_eq!(small, vec!["blip"]);
        assert_eq!(big, vec!["marathon"]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let records = vec![
            task("Alice", "exactly", 8, "8"),
            task("Alice", "cent", 9, "0.01"),
            task("Alice", "last", 10, "1"),
        ];
        let classification = classify_tasks(&records, Decimal::from(8));
        assert!(classification.small["Alice"].is_empty());
        assert!(classification.big["Alice"].is_empty());
    }

    #[test]
    fn test_last_record_is_never_classified() {
        let records = vec![
            task("Solo", "huge", 9, "12"),
            task("Pair", "tiny", 9, "0"),
            task("Pair", "huge", 10, "12"),
        ];
        let classification = classify_tasks(&records, Decimal::from(8));

        assert!(classification.small["Solo"].is_empty());
        assert!(classification.big["Solo"].is_empty());
        assert_eq!(classification.small["Pair"].len(), 1);
        assert!(classification.big["Pair"].is_empty());
    }

    #[test]
    fn test_negative_threshold_flags_both() {
        let records = vec![task("Alice", "zero", 8, "0"), task("Alice", "last", 9, "1")];
        let classification = classify_tasks(&records, Decimal::from(-1));
        assert_eq!(classification.small["Alice"].len(), 1);
        assert_eq!(classification.big["Alice"].len(), 1);
    }
}
