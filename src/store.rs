//! Reference Progress Store
//!
//! In-memory implementation of the collaborator contract the scheduling
//! core is written against: per-item lifecycle updates, optimistic
//! versioning so read-recompute-write cycles cannot lose updates, and
//! snapshot exchange in the historic payload shape.
//!
//! Mutation is `&mut self`: one writer per learner session. The version
//! numbers protect writers that operate on copies of a record (another
//! session, a sync job) from silently overwriting each other.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanitize::{sanitize_record, to_raw, ProgressSnapshot, SanitizeError, SNAPSHOT_VERSION};
use crate::scheduler::Scheduler;
use crate::types::ItemProgress;

// ==================== Errors ====================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version conflict for {item_id:?}: expected {expected}, current {current}")]
    VersionConflict {
        item_id: String,
        expected: u64,
        current: u64,
    },
    #[error("snapshot record for {item_id:?} rejected")]
    InvalidSnapshotRecord {
        item_id: String,
        #[source]
        source: SanitizeError,
    },
}

// ==================== Records ====================

/// A progress record plus its optimistic-concurrency version.
///
/// The version starts at 1 when the record is created and increases by one
/// on every mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedRecord {
    pub progress: ItemProgress,
    pub version: u64,
}

// ==================== Store ====================

/// In-memory progress store for one learner.
#[derive(Clone, Debug, Default)]
pub struct ProgressStore {
    records: HashMap<String, VersionedRecord>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, item_id: &str) -> Option<&VersionedRecord> {
        self.records.get(item_id)
    }

    /// The bare progress record, without version metadata.
    pub fn progress(&self, item_id: &str) -> Option<&ItemProgress> {
        self.records.get(item_id).map(|rec| &rec.progress)
    }

    /// Owned copy of the progress map, in the shape the ranker and stats
    /// functions consume.
    pub fn progress_map(&self) -> HashMap<String, ItemProgress> {
        self.records
            .iter()
            .map(|(id, rec)| (id.clone(), rec.progress.clone()))
            .collect()
    }

    /// Applies one review at `now`.
    ///
    /// First review of an item creates its record at stage 0. After that a
    /// remembered answer advances the stage by one and a forgotten answer
    /// keeps it, so the stage never decreases. Either way the next due time
    /// is recomputed from the (possibly advanced) stage. Mastered items are
    /// left untouched; they stay out of scheduling until reset.
    pub fn record_review(
        &mut self,
        item_id: &str,
        remembered: bool,
        now: DateTime<Utc>,
        scheduler: &mut Scheduler,
    ) -> &VersionedRecord {
        match self.records.entry(item_id.to_string()) {
            Entry::Occupied(occupied) => {
                let rec = occupied.into_mut();
                if rec.progress.mastered {
                    tracing::debug!(item_id, "review ignored for mastered item");
                    return rec;
                }
                if remembered {
                    rec.progress.stage = rec.progress.stage.saturating_add(1);
                }
                rec.progress.next_due_at = Some(scheduler.next_review_at(rec.progress.stage, now));
                rec.progress.last_reviewed_at = Some(now);
                rec.version += 1;
                tracing::debug!(
                    item_id,
                    stage = rec.progress.stage,
                    remembered,
                    "review recorded"
                );
                rec
            }
            Entry::Vacant(vacant) => {
                let mut progress = ItemProgress::new();
                progress.next_due_at = Some(scheduler.next_review_at(progress.stage, now));
                progress.last_reviewed_at = Some(now);
                tracing::debug!(item_id, "progress record created");
                vacant.insert(VersionedRecord {
                    progress,
                    version: 1,
                })
            }
        }
    }

    /// Marks an item mastered unconditionally, creating the record if the
    /// item was never reviewed.
    pub fn mark_mastered(&mut self, item_id: &str) -> &VersionedRecord {
        let rec = self
            .records
            .entry(item_id.to_string())
            .or_insert_with(|| VersionedRecord {
                progress: ItemProgress::new(),
                version: 0,
            });
        rec.progress.mastered = true;
        rec.version += 1;
        tracing::debug!(item_id, "item marked mastered");
        rec
    }

    /// Removes an item's record, returning it to the New state. Reports
    /// whether a record existed.
    pub fn reset(&mut self, item_id: &str) -> bool {
        let existed = self.records.remove(item_id).is_some();
        if existed {
            tracing::debug!(item_id, "progress reset");
        }
        existed
    }

    /// Compare-and-swap write for callers holding a copy of a record.
    ///
    /// `expected_version` is the version the caller read, or 0 when the
    /// caller believes the record does not exist yet. A mismatch leaves the
    /// store unchanged and reports the current version.
    pub fn put_versioned(
        &mut self,
        item_id: &str,
        progress: ItemProgress,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        match self.records.get_mut(item_id) {
            None => {
                if expected_version != 0 {
                    tracing::warn!(item_id, expected_version, "stale write for missing record");
                    return Err(StoreError::VersionConflict {
                        item_id: item_id.to_string(),
                        expected: expected_version,
                        current: 0,
                    });
                }
                self.records.insert(
                    item_id.to_string(),
                    VersionedRecord {
                        progress,
                        version: 1,
                    },
                );
                Ok(1)
            }
            Some(rec) => {
                if rec.version != expected_version {
                    tracing::warn!(
                        item_id,
                        expected = expected_version,
                        current = rec.version,
                        "stale write rejected"
                    );
                    return Err(StoreError::VersionConflict {
                        item_id: item_id.to_string(),
                        expected: expected_version,
                        current: rec.version,
                    });
                }
                rec.progress = progress;
                rec.version += 1;
                Ok(rec.version)
            }
        }
    }

    // ==================== Snapshots ====================

    /// Serializes the full store into the interchange payload.
    pub fn export_snapshot(&self, now: DateTime<Utc>) -> ProgressSnapshot {
        let records = self
            .records
            .iter()
            .map(|(id, rec)| (id.clone(), to_raw(&rec.progress)))
            .collect();
        tracing::debug!(count = self.records.len(), "snapshot exported");
        ProgressSnapshot {
            records,
            last_updated: now,
            version: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Replaces the store's contents with a snapshot.
    ///
    /// Every record is validated before anything is applied; one bad record
    /// aborts the whole import and the store keeps its previous contents.
    /// Imported records restart at version 1. Returns the number of records
    /// imported.
    pub fn import_snapshot(&mut self, snapshot: &ProgressSnapshot) -> Result<usize, StoreError> {
        let mut incoming = HashMap::with_capacity(snapshot.records.len());
        for (item_id, raw) in &snapshot.records {
            let progress =
                sanitize_record(raw).map_err(|source| StoreError::InvalidSnapshotRecord {
                    item_id: item_id.clone(),
                    source,
                })?;
            incoming.insert(
                item_id.clone(),
                VersionedRecord {
                    progress,
                    version: 1,
                },
            );
        }
        let count = incoming.len();
        self.records = incoming;
        tracing::debug!(count, last_updated = %snapshot.last_updated, "snapshot imported");
        Ok(count)
    }
}
