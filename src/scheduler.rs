//! Review Scheduling
//!
//! Decides when an item is next due after a review, and whether an existing
//! record is due right now. The current instant is always an explicit
//! argument so results are reproducible; nothing here reads the wall clock
//! during computation.

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::intervals::IntervalTable;
use crate::types::{ItemProgress, ItemState};

// ==================== Constants ====================

/// Default lower edge of the multiplicative jitter window.
pub const JITTER_MIN: f64 = 0.9;

/// Default upper edge of the multiplicative jitter window.
pub const JITTER_MAX: f64 = 1.1;

// ==================== Options ====================

/// Construction options for [`Scheduler`]. Unset fields fall back to the
/// reference table and the ±10% jitter window.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerOptions {
    /// Custom interval progression.
    pub intervals: Option<IntervalTable>,
    /// Lower jitter multiplier (default 0.9).
    pub jitter_min: Option<f64>,
    /// Upper jitter multiplier (default 1.1).
    pub jitter_max: Option<f64>,
    /// RNG seed for reproducible jitter. Defaults to system time.
    pub seed: Option<u64>,
}

// ==================== Scheduler ====================

/// Computes next-due timestamps with interval-table lookup plus jitter.
///
/// The jitter spreads items that reach the same stage at the same moment
/// across a window around the base interval, so review queues do not pile
/// up at exact round-hour boundaries. The generator is owned and seedable,
/// which keeps scheduling deterministic under a fixed seed.
#[derive(Clone, Debug)]
pub struct Scheduler {
    table: IntervalTable,
    jitter_min: f64,
    jitter_max: f64,
    rng: ChaCha8Rng,
}

impl Scheduler {
    /// Scheduler with the reference table and a time-derived seed.
    pub fn new() -> Self {
        Self::with_options(SchedulerOptions::default())
    }

    /// Scheduler with the reference table and a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_options(SchedulerOptions {
            seed: Some(seed),
            ..SchedulerOptions::default()
        })
    }

    pub fn with_options(options: SchedulerOptions) -> Self {
        let seed = options.seed.unwrap_or_else(|| {
            // Use system time as default seed
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        let jitter_min = options.jitter_min.unwrap_or(JITTER_MIN).max(0.0);
        let jitter_max = options.jitter_max.unwrap_or(JITTER_MAX).max(jitter_min);

        Self {
            table: options.intervals.unwrap_or_default(),
            jitter_min,
            jitter_max,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next due time for an item at `stage`, reviewed at `now`.
    ///
    /// Looks up the base hours for the (clamped) stage, scales them by a
    /// uniform draw from the jitter window, and adds the result to `now` at
    /// millisecond precision. With the defaults the result always lands in
    /// `[now + 0.9h, now + 1.1h]` for base hours `h`, and never before
    /// `now`.
    pub fn next_review_at(&mut self, stage: u32, now: DateTime<Utc>) -> DateTime<Utc> {
        let base = self.table.base_hours(stage);
        let jitter = self.jitter_min + self.rng.gen::<f64>() * (self.jitter_max - self.jitter_min);
        now + hours_to_duration(base * jitter)
    }

    pub fn table(&self) -> &IntervalTable {
        &self.table
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Due Predicate ====================

/// Whether an existing record is due at `now`.
///
/// Mastered records are never due. A record without a scheduled time is
/// vacuously due (it exists but the scheduler has not run for it yet).
pub fn is_due(progress: &ItemProgress, now: DateTime<Utc>) -> bool {
    if progress.mastered {
        return false;
    }
    match progress.next_due_at {
        None => true,
        Some(due) => due <= now,
    }
}

/// Places an item into one of the four disjoint states.
pub fn classify_item(progress: Option<&ItemProgress>, now: DateTime<Utc>) -> ItemState {
    match progress {
        None => ItemState::New,
        Some(p) if p.mastered => ItemState::Mastered,
        Some(p) if is_due(p, now) => ItemState::Due,
        Some(_) => ItemState::Learning,
    }
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    // ============ 调度测试 ============

    #[test]
    fn test_next_review_within_jitter_window_all_stages() {
        let mut scheduler = Scheduler::with_seed(7);
        let now = t0();
        for stage in 0..=12u32 {
            let base = scheduler.table().base_hours(stage);
            for _ in 0..50 {
                let due = scheduler.next_review_at(stage, now);
                let lo = now + hours_to_duration(base * JITTER_MIN);
                let hi = now + hours_to_duration(base * JITTER_MAX);
                assert!(due >= lo, "stage {stage}: {due} < {lo}");
                assert!(due <= hi, "stage {stage}: {due} > {hi}");
            }
        }
    }

    #[test]
    fn test_day_stage_lands_between_21_6_and_26_4_hours() {
        // base 24h, ±10% jitter
        let mut scheduler = Scheduler::with_seed(99);
        let now = t0();
        for _ in 0..200 {
            let due = scheduler.next_review_at(4, now);
            assert!(due >= now + Duration::milliseconds((21.6 * 3_600_000.0) as i64));
            assert!(due <= now + Duration::milliseconds((26.4 * 3_600_000.0) as i64));
        }
    }

    #[test]
    fn test_next_review_never_before_now() {
        let mut scheduler = Scheduler::with_seed(3);
        let now = t0();
        for stage in 0..=15u32 {
            assert!(scheduler.next_review_at(stage, now) >= now);
        }
    }

    #[test]
    fn test_stage_past_table_uses_last_interval() {
        let mut scheduler = Scheduler::with_options(SchedulerOptions {
            jitter_min: Some(1.0),
            jitter_max: Some(1.0),
            seed: Some(1),
            ..SchedulerOptions::default()
        });
        let now = t0();
        let at_max = scheduler.next_review_at(10, now);
        let beyond = scheduler.next_review_at(42, now);
        assert_eq!(at_max, beyond);
        assert_eq!(beyond, now + Duration::hours(4320));
    }

    #[test]
    fn test_zero_width_jitter_gives_exact_base_interval() {
        let mut scheduler = Scheduler::with_options(SchedulerOptions {
            jitter_min: Some(1.0),
            jitter_max: Some(1.0),
            seed: Some(5),
            ..SchedulerOptions::default()
        });
        let now = t0();
        assert_eq!(scheduler.next_review_at(4, now), now + Duration::hours(24));
        assert_eq!(scheduler.next_review_at(2, now), now + Duration::hours(1));
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let mut a = Scheduler::with_seed(2024);
        let mut b = Scheduler::with_seed(2024);
        let now = t0();
        for stage in [0u32, 3, 5, 9, 10, 20] {
            assert_eq!(a.next_review_at(stage, now), b.next_review_at(stage, now));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Scheduler::with_seed(1);
        let mut b = Scheduler::with_seed(2);
        let now = t0();
        let draws_a: Vec<_> = (0..8).map(|_| a.next_review_at(8, now)).collect();
        let draws_b: Vec<_> = (0..8).map(|_| b.next_review_at(8, now)).collect();
        assert_ne!(draws_a, draws_b);
    }

    // ============ 到期判定测试 ============

    #[test]
    fn test_unscheduled_record_is_due() {
        let p = ItemProgress::new();
        assert!(is_due(&p, t0()));
    }

    #[test]
    fn test_record_due_at_exact_boundary() {
        let now = t0();
        let p = ItemProgress {
            stage: 2,
            next_due_at: Some(now),
            mastered: false,
            last_reviewed_at: None,
        };
        assert!(is_due(&p, now));
    }

    #[test]
    fn test_overdue_record_is_due() {
        let now = t0();
        let p = ItemProgress {
            stage: 2,
            next_due_at: Some(now - Duration::hours(5)),
            mastered: false,
            last_reviewed_at: None,
        };
        assert!(is_due(&p, now));
    }

    #[test]
    fn test_future_record_is_not_due() {
        let now = t0();
        let p = ItemProgress {
            stage: 2,
            next_due_at: Some(now + Duration::minutes(1)),
            mastered: false,
            last_reviewed_at: None,
        };
        assert!(!is_due(&p, now));
    }

    #[test]
    fn test_mastered_record_is_never_due() {
        let now = t0();
        let overdue = ItemProgress {
            stage: 9,
            next_due_at: Some(now - Duration::days(30)),
            mastered: true,
            last_reviewed_at: None,
        };
        assert!(!is_due(&overdue, now));

        let unscheduled = ItemProgress {
            stage: 0,
            next_due_at: None,
            mastered: true,
            last_reviewed_at: None,
        };
        assert!(!is_due(&unscheduled, now));
    }

    // ============ 状态划分测试 ============

    #[test]
    fn test_classify_covers_all_four_states() {
        let now = t0();
        assert_eq!(classify_item(None, now), ItemState::New);

        let mastered = ItemProgress {
            mastered: true,
            ..ItemProgress::new()
        };
        assert_eq!(classify_item(Some(&mastered), now), ItemState::Mastered);

        let due = ItemProgress {
            stage: 1,
            next_due_at: Some(now - Duration::hours(1)),
            mastered: false,
            last_reviewed_at: None,
        };
        assert_eq!(classify_item(Some(&due), now), ItemState::Due);

        let learning = ItemProgress {
            stage: 1,
            next_due_at: Some(now + Duration::hours(1)),
            mastered: false,
            last_reviewed_at: None,
        };
        assert_eq!(classify_item(Some(&learning), now), ItemState::Learning);
    }

    #[test]
    fn test_mastered_flag_wins_over_overdue_time() {
        let now = t0();
        let p = ItemProgress {
            stage: 4,
            next_due_at: Some(now - Duration::days(2)),
            mastered: true,
            last_reviewed_at: None,
        };
        assert_eq!(classify_item(Some(&p), now), ItemState::Mastered);
    }
}
