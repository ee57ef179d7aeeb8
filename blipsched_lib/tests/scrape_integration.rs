use std::collections::HashMap;

use blipsched_lib::{payload, units, Aggregator, BlipClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn month_page_end_to_end() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schedule"))
        .and(query_param("year", "2026"))
        .and(query_param("month", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("schedule_march.html")))
        .mount(&mock_server)
        .await;

    let client = BlipClient::with_base_url(&mock_server.uri()).unwrap();
    let html = client.schedule_page(2026, 3).await.unwrap();
    let events = payload::extract_events(&html);
    // Four records parse out of the payload; the corrupt one is skipped.
    assert_eq!(events.len(), 4);

    let mut aggregator = Aggregator::new();
    let added = aggregator.add_month(2026, 3, events);
    // The March 31 late-night radio slot rolls into April in KST and the
    // second chunk repeats the release, so only two events survive.
    assert_eq!(added, 2);

    let doc = aggregator.finalize(&[(2026, 3)], HashMap::new(), "2026-03-20T00:00:00Z".into());
    let release = &doc.events["2026-03-09"][0];
    assert_eq!(release.title, "미니 5집 발매");
    assert_eq!(release.category, "발매");
    assert_eq!(release.marketing.as_deref(), Some("release_day"));
    assert_eq!(release.unit_id, Some(11));

    let concert = &doc.events["2026-03-14"][0];
    assert_eq!(concert.category, "행사");
    assert_eq!(concert.marketing, None);

    assert!(!doc.events.contains_key("2026-04-01"));
    assert_eq!(doc.stats.total_events, 2);
    assert_eq!(doc.stats.days_with_events, 2);
}

#[tokio::test]
async fn unit_mapping_resolves_from_home_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("home.html")))
        .mount(&mock_server)
        .await;

    let client = BlipClient::with_base_url(&mock_server.uri()).unwrap();
    let mapping = units::resolve_units(&client).await;

    assert_eq!(mapping.len(), 3);
    assert_eq!(mapping[&11].ko, "르세라핌");
    assert_eq!(mapping[&11].en, "LE SSERAFIM");
    // No English name in the payload for 데이식스.
    assert_eq!(mapping[&15].en, "데이식스");
}

#[tokio::test]
async fn unit_mapping_is_empty_on_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = BlipClient::with_base_url(&mock_server.uri()).unwrap();
    assert!(units::resolve_units(&client).await.is_empty());
}

#[tokio::test]
async fn month_fetch_error_surfaces_as_scrape_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = BlipClient::with_base_url(&mock_server.uri()).unwrap();
    assert!(client.schedule_page(2026, 3).await.is_err());
}

#[tokio::test]
async fn output_round_trip_has_no_internal_ids() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("schedule_march.html")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("home.html")))
        .mount(&mock_server)
        .await;

    let client = BlipClient::with_base_url(&mock_server.uri()).unwrap();
    let mapping = units::resolve_units(&client).await;

    let mut aggregator = Aggregator::new();
    let html = client.schedule_page(2026, 3).await.unwrap();
    aggregator.add_month(2026, 3, payload::extract_events(&html));
    let doc = aggregator.finalize(&[(2026, 3)], mapping, "2026-03-20T00:00:00Z".into());

    // Only referenced units survive pruning; 12 gets the placeholder pair.
    assert_eq!(doc.units.len(), 2);
    assert_eq!(doc.units["12"].en, "Unknown");
    assert!(!doc.units.contains_key("14"));

    let json = serde_json::to_string_pretty(&doc).unwrap();
    let reloaded: serde_json::Value = serde_json::from_str(&json).unwrap();
    for (_, bucket) in reloaded["events"].as_object().unwrap() {
        for event in bucket.as_array().unwrap() {
            assert!(event.get("scheduleId").is_none());
            assert!(event.get("title").is_some());
            assert!(event.get("category").is_some());
        }
    }
}
