//! Priority Ranking
//!
//! Scores every item of a catalog (new, due, not-yet-due, or mastered)
//! and produces the presentation order for a review session. Scoring is a
//! pure function of the record and the caller's `now`; one `now` is shared
//! by a whole ranking pass so a single sort is internally consistent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{ItemProgress, MAX_STAGE};

// ==================== Constants ====================

/// Fixed score for items with no progress record.
pub const NEW_ITEM_SCORE: f64 = 1000.0;

/// Fixed score for mastered items.
pub const MASTERED_SCORE: f64 = -1.0;

/// Score contributed per hour overdue.
pub const OVERDUE_WEIGHT: f64 = 10.0;

// ==================== Weights ====================

/// Tunable scoring policy.
///
/// The defaults reproduce the observed heuristic: lateness at 10 points
/// per hour plus a flat bonus of up to 10 for items reviewed few times.
/// The two terms are summed, not ordered lexically, so a badly overdue
/// well-learned item can outrank a barely-overdue fresh one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankWeights {
    /// Score for an absent record (new items surface first).
    pub new_item_score: f64,
    /// Score for a mastered record (sorts to the back).
    pub mastered_score: f64,
    /// Points per hour overdue; negative overdue (clock skew or a due time
    /// still ahead) subtracts.
    pub overdue_weight: f64,
    /// Flat bonus is `stage_bonus_cap - min(stage, stage_bonus_cap)`.
    pub stage_bonus_cap: u32,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            new_item_score: NEW_ITEM_SCORE,
            mastered_score: MASTERED_SCORE,
            overdue_weight: OVERDUE_WEIGHT,
            stage_bonus_cap: MAX_STAGE,
        }
    }
}

// ==================== Scoring ====================

/// Priority score for one item at `now`.
///
/// Absent record → `new_item_score`. Mastered → `mastered_score`. Otherwise
/// `overdue_hours * overdue_weight + (cap - min(stage, cap))`, where an
/// unscheduled record counts zero overdue hours (its effective due time is
/// `now` itself).
pub fn priority_score(
    progress: Option<&ItemProgress>,
    now: DateTime<Utc>,
    weights: &RankWeights,
) -> f64 {
    let p = match progress {
        None => return weights.new_item_score,
        Some(p) => p,
    };
    if p.mastered {
        return weights.mastered_score;
    }

    let effective_due = p.next_due_at.unwrap_or(now);
    let overdue_hours = (now - effective_due).num_milliseconds() as f64 / 3_600_000.0;
    let stage_bonus = (weights.stage_bonus_cap - p.stage.min(weights.stage_bonus_cap)) as f64;

    overdue_hours * weights.overdue_weight + stage_bonus
}

// ==================== Ranking ====================

/// One entry of a ranking result, highest score first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub id: String,
    pub score: f64,
}

/// Orders `(id, progress)` pairs by descending priority score.
///
/// Scoring runs in parallel; the sort is stable, so entries with equal
/// scores keep their input order.
pub fn rank(
    items: &[(String, Option<ItemProgress>)],
    now: DateTime<Utc>,
    weights: &RankWeights,
) -> Vec<RankedItem> {
    let mut scored: Vec<RankedItem> = items
        .par_iter()
        .map(|(id, progress)| RankedItem {
            id: id.clone(),
            score: priority_score(progress.as_ref(), now, weights),
        })
        .collect();
    sort_descending_stable(&mut scored);
    scored
}

/// [`rank`] over a catalog: every id is scored, ids missing from
/// `progress_by_item` count as new.
pub fn rank_catalog(
    item_ids: &[String],
    progress_by_item: &HashMap<String, ItemProgress>,
    now: DateTime<Utc>,
    weights: &RankWeights,
) -> Vec<RankedItem> {
    let mut scored: Vec<RankedItem> = item_ids
        .par_iter()
        .map(|id| RankedItem {
            id: id.clone(),
            score: priority_score(progress_by_item.get(id), now, weights),
        })
        .collect();
    sort_descending_stable(&mut scored);
    scored
}

fn sort_descending_stable(scored: &mut [RankedItem]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}
