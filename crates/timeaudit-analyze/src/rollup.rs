//! Time totals and the user/date/description rollup.

use indexmap::IndexMap;
use rust_decimal::Decimal;

use timeaudit_core::{AuditError, Rollup, RollupEntry, TaskRecord, TimeStats, UserRollup};

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub time_stats: TimeStats,
    pub rollup: Rollup,
}

/// Sum durations overall, per user, and per (user, start date, description).
///
/// Unlike overlap detection and classification, every record counts.
/// Groups keep first-seen order at each level. Sums that leave the decimal
/// range fail with [`AuditError::DurationOverflow`].
pub fn aggregate(records: &[TaskRecord]) -> Result<Aggregation, AuditError> {
    let mut time_stats = TimeStats::default();
    let mut sums: IndexMap<&str, IndexMap<&str, IndexMap<&str, Decimal>>> = IndexMap::new();

    for record in records {
        let overflow = || AuditError::DurationOverflow {
            user: record.user.clone(),
        };

        time_stats.total_time = time_stats
            .total_time
            .checked_add(record.duration)
            .ok_or_else(overflow)?;

        let per_user = time_stats
            .time_per_user
            .entry(record.user.clone())
            .or_insert(Decimal::ZERO);
        *per_user = per_user.checked_add(record.duration).ok_or_else(overflow)?;

        let per_task = sums
            .entry(record.user.as_str())
            .or_default()
            .entry(record.start_date.as_str())
            .or_default()
            .entry(record.description.as_str())
            .or_insert(Decimal::ZERO);
        *per_task = per_task.checked_add(record.duration).ok_or_else(overflow)?;
    }

    let rollup = sums
        .into_iter()
        .map(|(user, dates)| {
            let dates: UserRollup = dates
                .into_iter()
                .map(|(date, descriptions)| {
                    let entries: Vec<RollupEntry> = descriptions
                        .into_iter()
                        .map(|(description, duration)| RollupEntry {
                            description: description.to_string(),
                            duration,
                            duration_hm: format_hm(duration),
                        })
                        .collect();
                    (date.to_string(), entries)
                })
                .collect();
            (user.to_string(), dates)
        })
        .collect();

    Ok(Aggregation { time_stats, rollup })
}

/// Render decimal hours as `"Xh Ym"`.
///
/// Hours and minutes are both floored; nothing is rounded up.
pub fn format_hm(hours: Decimal) -> String {
    let whole = hours.floor();
    // The fractional part is below one, so this cannot overflow.
    let minutes = ((hours - whole) * Decimal::from(60)).floor();
    format!("{}h {}m", whole.normalize(), minutes.normalize())
}
