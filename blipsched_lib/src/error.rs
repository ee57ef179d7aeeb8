//! Error types for the scraping pipeline.

use reqwest::StatusCode;

/// Errors produced while fetching a page. Payload mining never errors, it
/// only yields fewer records, so transport is the sole failure surface.
/// None of these abort a run; the driver downgrades every variant to an
/// empty contribution for the page that produced it.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    HttpStatus { status: StatusCode },
}
