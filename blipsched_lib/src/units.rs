//! Unit (performer/group) name resolution from the home page payload.

use std::collections::HashMap;

use regex::Regex;

use crate::client::BlipClient;
use crate::payload::payload_chunks;
use crate::types::NamePair;

/// Marker identifying the hydration chunk that carries unit records.
const UNIT_MARKER: &str = "\"unitName\":";

/// Names substituted for unit IDs the home page never mentioned.
pub fn placeholder_names() -> NamePair {
    NamePair {
        ko: "알 수 없음".to_string(),
        en: "Unknown".to_string(),
    }
}

/// Builds the unit ID to display-name mapping from the home page.
///
/// Never fails: transport errors, a missing chunk, or an unrecognizable
/// payload all degrade to an empty map, and event records keep their IDs
/// with placeholder names. The first chunk yielding a non-empty mapping
/// wins; later chunks are ignored.
pub async fn resolve_units(client: &BlipClient) -> HashMap<i64, NamePair> {
    let html = match client.home_page().await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("unit mapping fetch failed: {e}");
            return HashMap::new();
        }
    };
    let units = units_from_page(&html);
    if units.is_empty() {
        tracing::warn!("no unit mapping found on home page");
    }
    units
}

fn units_from_page(html: &str) -> HashMap<i64, NamePair> {
    let (Ok(ko_re), Ok(en_re)) = (
        Regex::new(r#""unitId":(\d+),"unitName":"([^"]+)""#),
        Regex::new(r#""unitId":(\d+)[^{}]*"unitEnName":"([^"]+)""#),
    ) else {
        return HashMap::new();
    };

    for chunk in payload_chunks(html) {
        if !chunk.contains(UNIT_MARKER) {
            continue;
        }
        let mut units: HashMap<i64, NamePair> = HashMap::new();
        for cap in ko_re.captures_iter(&chunk) {
            let Ok(id) = cap[1].parse::<i64>() else { continue };
            let ko = cap[2].to_string();
            // English name defaults to the Korean one until proven otherwise.
            units.insert(id, NamePair { en: ko.clone(), ko });
        }
        for cap in en_re.captures_iter(&chunk) {
            let Ok(id) = cap[1].parse::<i64>() else { continue };
            if let Some(pair) = units.get_mut(&id) {
                pair.en = cap[2].to_string();
            }
        }
        if !units.is_empty() {
            return units;
        }
    }
    HashMap::new()
}
