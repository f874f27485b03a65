//! Review Interval Table
//!
//! Maps a repetition stage to the base wait before the next review. The
//! progression is a tunable parameter; clamping at the last stage and
//! monotonic growth are not, since a shrinking interval would regress due
//! times for heavily-reviewed items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==================== Constants ====================

/// Reference progression in hours, indexed by repetition stage.
pub const REVIEW_INTERVAL_HOURS: [f64; 11] = [
    0.01,   // 1 minute (new items)
    0.1,    // 6 minutes
    1.0,    // 1 hour
    6.0,    // 6 hours
    24.0,   // 1 day
    72.0,   // 3 days
    168.0,  // 1 week
    336.0,  // 2 weeks
    720.0,  // 1 month
    2160.0, // 3 months
    4320.0, // 6 months
];

// ==================== Errors ====================

/// Rejected interval-table configurations.
#[derive(Debug, Error, PartialEq)]
pub enum IntervalTableError {
    #[error("interval table must have at least one entry")]
    Empty,
    #[error("interval for stage {stage} is not a finite non-negative number: {hours}")]
    InvalidHours { stage: u32, hours: f64 },
    #[error("interval for stage {stage} ({hours}h) is shorter than the previous stage ({previous}h)")]
    NotMonotonic { stage: u32, hours: f64, previous: f64 },
}

// ==================== Interval Table ====================

/// Stage → base-hours lookup with clamp-at-max.
///
/// Any stage past the last configured entry returns the last entry, so
/// review gaps stop growing once the progression is exhausted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct IntervalTable {
    hours: Vec<f64>,
}

impl IntervalTable {
    /// Builds a table from a custom progression.
    ///
    /// The progression must be non-empty, finite, non-negative, and
    /// monotonically non-decreasing.
    pub fn try_new(hours: Vec<f64>) -> Result<Self, IntervalTableError> {
        if hours.is_empty() {
            return Err(IntervalTableError::Empty);
        }
        for (i, &h) in hours.iter().enumerate() {
            if !h.is_finite() || h < 0.0 {
                return Err(IntervalTableError::InvalidHours {
                    stage: i as u32,
                    hours: h,
                });
            }
            if i > 0 && h < hours[i - 1] {
                return Err(IntervalTableError::NotMonotonic {
                    stage: i as u32,
                    hours: h,
                    previous: hours[i - 1],
                });
            }
        }
        Ok(Self { hours })
    }

    /// Base wait in hours for `stage`, clamping past the last entry.
    pub fn base_hours(&self, stage: u32) -> f64 {
        let idx = (stage as usize).min(self.hours.len() - 1);
        self.hours[idx]
    }

    /// Highest stage with its own entry; everything above clamps here.
    pub fn max_stage(&self) -> u32 {
        (self.hours.len() - 1) as u32
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self {
            hours: REVIEW_INTERVAL_HOURS.to_vec(),
        }
    }
}

impl TryFrom<Vec<f64>> for IntervalTable {
    type Error = IntervalTableError;

    fn try_from(hours: Vec<f64>) -> Result<Self, Self::Error> {
        Self::try_new(hours)
    }
}

impl From<IntervalTable> for Vec<f64> {
    fn from(table: IntervalTable) -> Self {
        table.hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_STAGE;

    // ============ 默认表测试 ============

    #[test]
    fn test_default_table_reference_values() {
        let table = IntervalTable::default();
        assert_eq!(table.base_hours(0), 0.01);
        assert_eq!(table.base_hours(1), 0.1);
        assert_eq!(table.base_hours(2), 1.0);
        assert_eq!(table.base_hours(3), 6.0);
        assert_eq!(table.base_hours(4), 24.0);
        assert_eq!(table.base_hours(5), 72.0);
        assert_eq!(table.base_hours(6), 168.0);
        assert_eq!(table.base_hours(7), 336.0);
        assert_eq!(table.base_hours(8), 720.0);
        assert_eq!(table.base_hours(9), 2160.0);
        assert_eq!(table.base_hours(10), 4320.0);
    }

    #[test]
    fn test_default_table_max_stage() {
        assert_eq!(IntervalTable::default().max_stage(), MAX_STAGE);
    }

    #[test]
    fn test_default_table_is_monotonic() {
        let table = IntervalTable::default();
        for stage in 0..MAX_STAGE {
            assert!(table.base_hours(stage + 1) >= table.base_hours(stage));
        }
    }

    // ============ 钳制测试 ============

    #[test]
    fn test_stage_beyond_table_clamps_to_last() {
        let table = IntervalTable::default();
        assert_eq!(table.base_hours(11), 4320.0);
        assert_eq!(table.base_hours(99), 4320.0);
        assert_eq!(table.base_hours(u32::MAX), 4320.0);
    }

    #[test]
    fn test_single_entry_table_clamps_everything() {
        let table = IntervalTable::try_new(vec![2.5]).unwrap();
        assert_eq!(table.max_stage(), 0);
        assert_eq!(table.base_hours(0), 2.5);
        assert_eq!(table.base_hours(100), 2.5);
    }

    // ============ 校验测试 ============

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(
            IntervalTable::try_new(vec![]),
            Err(IntervalTableError::Empty)
        );
    }

    #[test]
    fn test_non_monotonic_table_rejected() {
        let err = IntervalTable::try_new(vec![1.0, 6.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            IntervalTableError::NotMonotonic {
                stage: 2,
                hours: 2.0,
                previous: 6.0
            }
        );
    }

    #[test]
    fn test_negative_and_nan_hours_rejected() {
        assert!(matches!(
            IntervalTable::try_new(vec![-1.0]),
            Err(IntervalTableError::InvalidHours { stage: 0, .. })
        ));
        assert!(matches!(
            IntervalTable::try_new(vec![1.0, f64::NAN]),
            Err(IntervalTableError::InvalidHours { stage: 1, .. })
        ));
    }

    #[test]
    fn test_equal_adjacent_entries_allowed() {
        let table = IntervalTable::try_new(vec![1.0, 1.0, 2.0]).unwrap();
        assert_eq!(table.base_hours(1), 1.0);
    }

    // ============ 序列化测试 ============

    #[test]
    fn test_serde_round_trip() {
        let table = IntervalTable::default();
        let json = serde_json::to_string(&table).unwrap();
        let back: IntervalTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_serde_rejects_invalid_table() {
        let res: Result<IntervalTable, _> = serde_json::from_str("[6.0, 1.0]");
        assert!(res.is_err());
        let res: Result<IntervalTable, _> = serde_json::from_str("[]");
        assert!(res.is_err());
    }
}
