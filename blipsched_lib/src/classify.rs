//! Two-pass event classification.
//!
//! The primary pass picks the calendar category shown on the schedule; the
//! marketing pass independently tags purchase-urgency signals. The two never
//! feed into each other.

/// Calendar categories in display order, with their hex colors.
pub static CATEGORY_COLORS: [(&str, &str); 8] = [
    ("축하", "#4ECDC4"),
    ("발매", "#FF6B6B"),
    ("방송", "#FFE66D"),
    ("구매", "#95E1D3"),
    ("행사", "#C7CEEA"),
    ("기타", "#999999"),
    ("비공식", "#FFB6B9"),
    ("SNS", "#8EC5FC"),
];

/// Fallback category when nothing else applies.
pub const CATEGORY_OTHER: &str = "기타";

/// Schedule type code the source uses for releases. Deliberately NOT in the
/// type-code table below: a release code without a release-style keyword in
/// the title has proven too noisy to trust.
const RELEASE_TYPE: i64 = 2;

/// Keyword table for the primary pass. Slice order IS the precedence: a
/// title matching keywords from several categories gets the earliest one.
/// Keywords are lowercase; titles are lowercased once before matching.
static KEYWORD_PRIORITY: &[(&str, &[&str])] = &[
    (
        "방송",
        &[
            "방송", "음악중심", "뮤직뱅크", "인기가요", "엠카운트다운", "쇼챔피언", "라디오",
            "radio", "on air",
        ],
    ),
    (
        "구매",
        &[
            "예약판매", "예약 판매", "예판", "pre-order", "preorder", "럭키드로우",
            "lucky draw", "특전", "공동구매", "pob",
        ],
    ),
    (
        "발매",
        &[
            "발매", "컴백", "comeback", "release", "앨범", "album", "싱글", "single", "음원",
        ],
    ),
    (
        "행사",
        &[
            "콘서트", "concert", "팬미팅", "fan meeting", "팬사인회", "fansign", "페스티벌",
            "festival", "시상식", "투어", "tour",
        ],
    ),
    (
        "SNS",
        &[
            "인스타", "instagram", "위버스", "weverse", "유튜브", "youtube", "틱톡", "tiktok",
            "브이라이브",
        ],
    ),
];

/// Marketing tiers, flattened in precedence order. Tier 1 entries are
/// purchase deadlines, tier 2 peak-demand days, tier 3 secondary signals;
/// the first matching entry anywhere in the list wins.
static MARKETING_TIERS: &[(&str, &[&str])] = &[
    // Tier 1
    ("pob_deadline", &["특전 마감", "혜택 마감", "pob 마감", "특전 신청 마감"]),
    ("lucky_draw_deadline", &["럭키드로우 마감", "lucky draw 마감", "럭드 마감"]),
    (
        "preorder_deadline",
        &["예약판매 마감", "예약 판매 마감", "예판 마감", "pre-order 마감", "preorder 마감"],
    ),
    // Tier 2
    ("release_day", &["발매", "release", "out now"]),
    ("first_press", &["초회한정", "초회 한정", "first press", "한정반"]),
    // Tier 3
    (
        "preorder_open",
        &["예약판매 시작", "예약 판매 시작", "예판 시작", "예약판매 오픈", "pre-order start"],
    ),
    ("fan_event", &["팬사인회", "팬미팅", "영상통화", "fansign", "fan meeting", "video call"]),
    ("restock", &["재입고", "재판매", "2차 판매", "restock"]),
];

/// Assigns the calendar category for an event title and type code.
pub fn classify(title: &str, schedule_type: Option<i64>) -> &'static str {
    let lowered = title.to_lowercase();

    // Anniversaries trump everything, keywords included.
    if has_anniversary_count(title) || lowered.contains("anniversary") {
        return "축하";
    }

    for (category, keywords) in KEYWORD_PRIORITY {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return category;
        }
    }

    match schedule_type {
        Some(RELEASE_TYPE) => CATEGORY_OTHER,
        Some(code) => category_for_type(code).unwrap_or(CATEGORY_OTHER),
        None => CATEGORY_OTHER,
    }
}

/// Tags a purchase-urgency signal, or `None` when no tier matches.
pub fn classify_marketing(title: &str) -> Option<&'static str> {
    let lowered = title.to_lowercase();
    MARKETING_TIERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(tag, _)| *tag)
}

/// True when the title carries a counted anniversary like `3주년`.
fn has_anniversary_count(title: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = title[from..].find("주년") {
        let at = from + pos;
        if title[..at].chars().next_back().is_some_and(|c| c.is_ascii_digit()) {
            return true;
        }
        from = at + "주년".len();
    }
    false
}

fn category_for_type(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("방송"),
        3 => Some("행사"),
        4 => Some("구매"),
        5 => Some("축하"),
        6 => Some("SNS"),
        7 => Some("비공식"),
        _ => None,
    }
}
