//! Overlap detection between consecutive tasks.
//!
//! Only neighbours in start order are compared: a task that overlaps the one
//! after next, but not the next one, is not reported.

use itertools::Itertools;
use tracing::debug;

use timeaudit_core::{OverlapPair, PerUser, TaskRecord};

use crate::timeline::user_timelines;

/// Find overlapping neighbours for every user.
///
/// Every user gets an entry, empty when nothing overlaps.
pub fn detect_overlaps(records: &[TaskRecord]) -> PerUser<OverlapPair> {
    user_timelines(records)
        .into_iter()
        .map(|(user, timeline)| {
            let overlaps: Vec<OverlapPair> = timeline
                .iter()
                .tuple_windows()
                .filter(|(current, next)| current.end > next.start)
                .map(|(current, next)| OverlapPair::between(current, next))
                .collect();
            debug!(user, overlaps = overlaps.len(), "checked overlaps");
            (user.to_string(), overlaps)
        })
        .collect()
}
