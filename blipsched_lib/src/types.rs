//! Record types flowing through the schedule pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One event record as embedded in the schedule page's hydration payload.
///
/// Decoded best-effort with `serde_json::from_value`; records that fail to
/// deserialize are dropped by the extractor. Every field except the internal
/// `scheduleId` is optional because the upstream payload makes no promises.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Internal schedule identifier. Used only for record anchoring during
    /// extraction; must never reach the persisted output.
    pub schedule_id: i64,
    /// Event start, ISO 8601 in UTC, fractional seconds optional.
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Numeric schedule type code assigned by the source site.
    #[serde(default)]
    pub schedule_type: Option<i64>,
    /// Performer/group ID, resolved against the unit mapping.
    #[serde(default)]
    pub unit_id: Option<i64>,
}

/// A classified event as it appears in a date bucket of the output document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEvent {
    pub title: String,
    pub category: String,
    #[serde(rename = "unitId", skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,
    /// Marketing-tier tag from the secondary classifier; omitted when no
    /// tier matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing: Option<String>,
}

/// Korean/English display name pair for a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamePair {
    pub ko: String,
    pub en: String,
}

/// First and last calendar day covered by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Run-level summary counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub months_scraped: usize,
    pub days_with_events: usize,
    pub total_events: usize,
    pub total_units: usize,
}

/// The complete output document, rewritten from scratch on every run.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub updated_at: String,
    pub range: DateRange,
    pub categories: Vec<String>,
    pub category_colors: BTreeMap<String, String>,
    /// Unit ID (stringified, JSON object keys) to display names. Contains
    /// only units referenced by at least one retained event.
    pub units: BTreeMap<String, NamePair>,
    /// ISO date key to events, ascending by date.
    pub events: BTreeMap<String, Vec<ScheduleEvent>>,
    pub stats: ScheduleStats,
}
