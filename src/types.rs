//! Common Types and Constants
//!
//! Shared data structures used across the scheduling modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Maximum indexable repetition stage in the reference interval table.
///
/// Stages beyond this clamp to the last interval, and the ranker's
/// low-repetition bonus stops growing here.
pub const MAX_STAGE: u32 = 10;

// ==================== Progress Types ====================

/// Per-item review progress.
///
/// One record per learnable unit, created on the first review and mutated
/// on every subsequent one. An item with no record at all is in the `New`
/// state; the record itself never stores "new".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgress {
    /// Number of successful reviews so far. Only ever increases; resets
    /// happen by deleting the whole record.
    pub stage: u32,
    /// When the item should next be shown. Absent until the scheduler has
    /// run for this record.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub next_due_at: Option<DateTime<Utc>>,
    /// Mastered items are excluded from due-review scheduling until an
    /// explicit reset.
    #[serde(default)]
    pub mastered: bool,
    /// Audit field, not read by the algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl ItemProgress {
    /// Fresh record for an item's first review: stage 0, unscheduled.
    pub fn new() -> Self {
        Self {
            stage: 0,
            next_due_at: None,
            mastered: false,
            last_reviewed_at: None,
        }
    }
}

impl Default for ItemProgress {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Item States ====================

/// The four disjoint states an item can be in at any instant.
///
/// `New` means no progress record exists; the other three partition the
/// items that have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemState {
    New,
    Learning,
    Due,
    Mastered,
}

impl Default for ItemState {
    fn default() -> Self {
        Self::New
    }
}

impl ItemState {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LEARNING" => Self::Learning,
            "DUE" => Self::Due,
            "MASTERED" => Self::Mastered,
            _ => Self::New,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Learning => "LEARNING",
            Self::Due => "DUE",
            Self::Mastered => "MASTERED",
        }
    }
}

// ==================== Statistics ====================

/// Aggregate counts over one catalog of items.
///
/// The four counters always sum to the catalog size handed to
/// [`aggregate_stats`](crate::stats::aggregate_stats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    /// Items explicitly marked mastered.
    pub mastered: usize,
    /// Items with a record that are neither mastered nor currently due.
    pub learning: usize,
    /// Items due now or overdue.
    pub need_review: usize,
    /// Items with no progress record at all.
    #[serde(rename = "new")]
    pub new_items: usize,
}

impl StudyStats {
    /// Sum of all four counters.
    pub fn total(&self) -> usize {
        self.mastered + self.learning + self.need_review + self.new_items
    }
}
