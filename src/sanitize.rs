//! Ingestion Boundary
//!
//! Progress payloads arrive from collaborator stores in the historic JSON
//! shape: camelCase fields, RFC 3339 timestamp strings, optional fields
//! freely omitted. Everything is validated here, once, so the scheduling
//! core can assume well-formed records and stay free of internal checks.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ItemProgress;

// ==================== Constants ====================

/// Schema version written into exported snapshots.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

// ==================== Errors ====================

/// Rejected raw records.
#[derive(Debug, Error, PartialEq)]
pub enum SanitizeError {
    #[error("review count must be non-negative, got {0}")]
    NegativeReviewCount(i64),
    #[error("{field} is not a valid RFC 3339 timestamp: {value:?}")]
    MalformedTimestamp { field: &'static str, value: String },
    #[error("{field} predates the Unix epoch: {value}")]
    PreEpochTimestamp {
        field: &'static str,
        value: DateTime<Utc>,
    },
}

// ==================== Raw Shapes ====================

/// One progress record as persisted by collaborator stores.
///
/// `reviewCount` is the historic name for the repetition stage. Timestamps
/// are RFC 3339 strings (JavaScript `toISOString()` output in legacy data).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgressRecord {
    #[serde(default)]
    pub review_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<String>,
    #[serde(default)]
    pub mastered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<String>,
}

/// The interchange payload exchanged with persistence collaborators.
///
/// `masteredWords` is the historic key and holds the full progress map,
/// not just mastered entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(rename = "masteredWords")]
    pub records: HashMap<String, RawProgressRecord>,
    pub last_updated: DateTime<Utc>,
    pub version: String,
}

// ==================== Validation ====================

/// Validates a raw record into a typed one.
///
/// Rejects negative review counts, unparseable timestamps, and timestamps
/// before the Unix epoch. Review counts past `u32::MAX` clamp; the stage
/// cap makes anything that large behave identically anyway.
pub fn sanitize_record(raw: &RawProgressRecord) -> Result<ItemProgress, SanitizeError> {
    if raw.review_count < 0 {
        return Err(SanitizeError::NegativeReviewCount(raw.review_count));
    }
    let stage = raw.review_count.min(u32::MAX as i64) as u32;
    let next_due_at = parse_timestamp("nextReview", raw.next_review.as_deref())?;
    let last_reviewed_at = parse_timestamp("lastReviewed", raw.last_reviewed.as_deref())?;

    Ok(ItemProgress {
        stage,
        next_due_at,
        mastered: raw.mastered,
        last_reviewed_at,
    })
}

/// Serializes a typed record back into the persisted shape.
///
/// Timestamps are rendered with millisecond precision and a `Z` suffix,
/// byte-compatible with JavaScript `toISOString()`.
pub fn to_raw(progress: &ItemProgress) -> RawProgressRecord {
    RawProgressRecord {
        review_count: progress.stage as i64,
        next_review: progress.next_due_at.map(format_timestamp),
        mastered: progress.mastered,
        last_reviewed: progress.last_reviewed_at.map(format_timestamp),
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, SanitizeError> {
    let raw = match value {
        None => return Ok(None),
        Some(s) => s,
    };
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|_| SanitizeError::MalformedTimestamp {
            field,
            value: raw.to_string(),
        })?
        .with_timezone(&Utc);
    if parsed.timestamp_millis() < 0 {
        return Err(SanitizeError::PreEpochTimestamp {
            field,
            value: parsed,
        });
    }
    Ok(Some(parsed))
}
