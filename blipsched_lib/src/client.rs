//! HTTP client for blip.kr pages.

use std::time::Duration;

use rand::Rng;

use crate::error::ScrapeError;

/// Fixed desktop-Chrome user agent; the site serves the hydration payload
/// to ordinary browsers without auth or cookies.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches blip.kr pages with browser-like headers and a fixed timeout.
pub struct BlipClient {
    base_url: String,
    http: reqwest::Client,
}

impl BlipClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_base_url("https://blip.kr")
    }

    /// Client against a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Home page, carrier of the unit name mapping.
    pub async fn home_page(&self) -> Result<String, ScrapeError> {
        self.fetch_html(&format!("{}/", self.base_url)).await
    }

    /// Schedule page for one calendar month.
    pub async fn schedule_page(&self, year: i32, month: u32) -> Result<String, ScrapeError> {
        self.fetch_html(&format!(
            "{}/schedule?year={}&month={}",
            self.base_url, year, month
        ))
        .await
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let resp = self
            .http
            .get(url)
            .header(
                "accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("accept-language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ScrapeError::HttpStatus {
                status: resp.status(),
            });
        }

        Ok(resp.text().await?)
    }
}

/// Uniform 1–2 s pause between requests, so a run does not hammer the site
/// or read as obviously automated. Plain in-task sleep, no scheduling.
pub async fn polite_pause() {
    let millis = rand::thread_rng().gen_range(1_000..=2_000);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
