use anyhow::Result;
use chrono::{Duration, SecondsFormat, Utc};

use blipsched_lib::{payload, polite_pause, scrape_window, units, Aggregator, BlipClient};

const OUTPUT_PATH: &str = "schedule.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blipsched_lib=info".parse().unwrap())
                .add_directive("blipsched_cli=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let client = BlipClient::new()?;

    // Window math runs on the KST calendar, same as the shifted date keys.
    let today = (Utc::now() + Duration::hours(9)).date_naive();
    let window = scrape_window(today);
    tracing::info!(months = window.len(), "scraping blip.kr schedule");

    let unit_names = units::resolve_units(&client).await;
    tracing::info!(units = unit_names.len(), "resolved unit names");
    polite_pause().await;

    let mut aggregator = Aggregator::new();
    for &(year, month) in &window {
        match client.schedule_page(year, month).await {
            Ok(html) => {
                let events = payload::extract_events(&html);
                let added = aggregator.add_month(year, month, events);
                tracing::info!(year, month, added, "month scraped");
            }
            // A lost month is an empty month; the run never aborts.
            Err(e) => tracing::warn!(year, month, "month fetch failed: {e}"),
        }
        polite_pause().await;
    }

    let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let document = aggregator.finalize(&window, unit_names, updated_at);
    if document.stats.total_events == 0 {
        tracing::warn!("no events collected; writing empty document");
    }

    std::fs::write(OUTPUT_PATH, serde_json::to_string_pretty(&document)?)?;
    tracing::info!(
        path = OUTPUT_PATH,
        days = document.stats.days_with_events,
        events = document.stats.total_events,
        "schedule written"
    );

    Ok(())
}
