//! Aggregate Progress Statistics
//!
//! Rolls one catalog's progress map up into the four state counters shown
//! on collection overviews.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::scheduler::is_due;
use crate::types::{ItemProgress, StudyStats};

/// Counts items per state: mastered, learning, due, and new.
///
/// Every record is classified once against the shared `now`; items absent
/// from `progress_by_item` make up the `new` count,
/// `total_item_count - |progress_by_item|`. The caller guarantees
/// `total_item_count >= |progress_by_item|`; the subtraction saturates so
/// the counter cannot go negative if that contract is broken. With the
/// contract upheld the four counters always sum to `total_item_count`.
pub fn aggregate_stats(
    progress_by_item: &HashMap<String, ItemProgress>,
    total_item_count: usize,
    now: DateTime<Utc>,
) -> StudyStats {
    let mut stats = StudyStats::default();
    for progress in progress_by_item.values() {
        if progress.mastered {
            stats.mastered += 1;
        } else if is_due(progress, now) {
            stats.need_review += 1;
        } else {
            stats.learning += 1;
        }
    }
    stats.new_items = total_item_count.saturating_sub(progress_by_item.len());
    stats
}
