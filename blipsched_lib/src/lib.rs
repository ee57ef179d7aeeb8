//! Scraping pipeline for blip.kr's K-pop schedule calendar.
//!
//! Fetches the server-rendered schedule pages, mines event records out of
//! the Next.js hydration payload, classifies them into calendar categories
//! and marketing tiers, and aggregates everything into one
//! [`types::ScheduleDocument`] covering a rolling one-year window.

pub mod aggregate;
pub mod classify;
pub mod client;
pub mod error;
pub mod payload;
pub mod types;
pub mod units;

pub use aggregate::{kst_date, scrape_window, window_range, Aggregator};
pub use client::{polite_pause, BlipClient};
pub use error::ScrapeError;
pub use types::{DateRange, NamePair, RawEvent, ScheduleDocument, ScheduleEvent, ScheduleStats};
