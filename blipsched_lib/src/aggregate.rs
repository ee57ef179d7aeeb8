//! Date bucketing, dedup, and the final document assembly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::classify::{classify, classify_marketing, CATEGORY_COLORS};
use crate::types::{DateRange, NamePair, RawEvent, ScheduleDocument, ScheduleEvent, ScheduleStats};
use crate::units::placeholder_names;

/// Hours added to UTC timestamps before taking the calendar date. Fixed
/// shift, not a tz-database zone: KST has no DST.
const KST_OFFSET_HOURS: i64 = 9;

/// Consecutive `(year, month)` pairs from the month before `today` through
/// the month containing `today + 365 days`, inclusive.
pub fn scrape_window(today: NaiveDate) -> Vec<(i32, u32)> {
    let (mut year, mut month) = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    let horizon = today + Duration::days(365);
    let last = (horizon.year(), horizon.month());

    let mut months = Vec::new();
    loop {
        months.push((year, month));
        if (year, month) == last {
            return months;
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
}

/// First day of the window's first month through the last day of its last
/// month, as ISO date strings.
pub fn window_range(window: &[(i32, u32)]) -> Option<DateRange> {
    let &(start_year, start_month) = window.first()?;
    let &(end_year, end_month) = window.last()?;
    let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;
    let end = last_day_of_month(end_year, end_month)?;
    Some(DateRange {
        start: start.to_string(),
        end: end.to_string(),
    })
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d - Duration::days(1))
}

/// KST calendar date for an ISO 8601 UTC timestamp, or `None` when the
/// timestamp does not parse.
pub fn kst_date(start_at: &str) -> Option<NaiveDate> {
    let ts = DateTime::parse_from_rfc3339(start_at).ok()?;
    Some((ts.with_timezone(&Utc) + Duration::hours(KST_OFFSET_HOURS)).date_naive())
}

/// Accumulates classified events into date buckets across monthly fetches.
#[derive(Debug, Default)]
pub struct Aggregator {
    buckets: BTreeMap<String, Vec<ScheduleEvent>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one month's raw events into the buckets and returns how many
    /// were retained.
    ///
    /// Dropped without comment: events with a missing or unparseable
    /// timestamp, a shifted date outside the month being processed (the
    /// source pads month views with neighbors), an empty trimmed title, or
    /// a title already present in the same date bucket. First occurrence
    /// wins a title tie, even across months.
    pub fn add_month(&mut self, year: i32, month: u32, events: Vec<RawEvent>) -> usize {
        let mut added = 0;
        for raw in events {
            let Some(date) = raw.start_at.as_deref().and_then(kst_date) else {
                continue;
            };
            if date.year() != year || date.month() != month {
                continue;
            }
            let title = raw.title.as_deref().map(str::trim).unwrap_or("");
            if title.is_empty() {
                continue;
            }
            let bucket = self.buckets.entry(date.to_string()).or_default();
            if bucket.iter().any(|e| e.title == title) {
                continue;
            }
            bucket.push(ScheduleEvent {
                title: title.to_string(),
                category: classify(title, raw.schedule_type).to_string(),
                unit_id: raw.unit_id,
                marketing: classify_marketing(title).map(str::to_string),
            });
            added += 1;
        }
        added
    }

    /// Assembles the output document: prunes the unit mapping to IDs that
    /// events actually reference (placeholder names for unknown IDs) and
    /// computes the summary stats.
    pub fn finalize(
        self,
        window: &[(i32, u32)],
        mut units: HashMap<i64, NamePair>,
        updated_at: String,
    ) -> ScheduleDocument {
        let referenced: BTreeSet<i64> = self
            .buckets
            .values()
            .flatten()
            .filter_map(|e| e.unit_id)
            .collect();
        let units: BTreeMap<String, NamePair> = referenced
            .iter()
            .map(|id| {
                let names = units.remove(id).unwrap_or_else(placeholder_names);
                (id.to_string(), names)
            })
            .collect();

        let total_events = self.buckets.values().map(Vec::len).sum();
        let stats = ScheduleStats {
            months_scraped: window.len(),
            days_with_events: self.buckets.len(),
            total_events,
            total_units: referenced.len(),
        };

        ScheduleDocument {
            updated_at,
            range: window_range(window).unwrap_or(DateRange {
                start: String::new(),
                end: String::new(),
            }),
            categories: CATEGORY_COLORS.iter().map(|(c, _)| c.to_string()).collect(),
            category_colors: CATEGORY_COLORS
                .iter()
                .map(|(c, hex)| (c.to_string(), hex.to_string()))
                .collect(),
            units,
            events: self.buckets,
            stats,
        }
    }
}
