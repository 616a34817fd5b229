//! Per-user chronological views over parsed records.

use indexmap::IndexMap;

use timeaudit_core::TaskRecord;

/// Records of one user, ordered by start instant.
pub type Timeline<'a> = Vec<&'a TaskRecord>;

/// Group records by user (first-seen order) and sort each group by start.
///
/// The sort is stable: records with equal starts keep their export order.
pub fn user_timelines(records: &[TaskRecord]) -> IndexMap<&str, Timeline<'_>> {
    let mut timelines: IndexMap<&str, Timeline<'_>> = IndexMap::new();
    for record in records {
        timelines
            .entry(record.user.as_str())
            .or_default()
            .push(record);
    }
    for timeline in timelines.values_mut() {
        timeline.sort_by_key(|record| record.start);
    }
    timelines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(user: &str, description: &str, hour: u32) -> TaskRecord {
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
            duration: Decimal::ONE,
        }
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let records = vec![
            record("Zed", "z1", 9),
            record("Amy", "a1", 9),
            record("Zed", "z2", 8),
        ];
        let timelines = user_timelines(&records);

        let users: Vec<_> = timelines.keys().copied().collect();
        assert_eq!(users, vec!["Zed", "Amy"]);

        let zed: Vec<_> = timelines["Zed"].iter().map(|r| r.description.as_str()).collect();
        assert_eq!(zed, vec!["z2", "z1"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_starts() {
        let records = vec![
            record("Amy", "first", 9),
            record("Amy", "second", 9),
            record("Amy", "earlier", 7),
        ];
        let timelines = user_timelines(&records);

        let order: Vec<_> = timelines["Amy"].iter().map(|r| r.description.as_str()).collect();
        assert_eq!(order, vec!["earlier", "first", "second"]);
    }
}
