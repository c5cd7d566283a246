//! Compiled pattern sets for the query normalizer.
//!
//! All regexes are compiled once and reused across calls. Route and time
//! extraction accept both the English wording and the original CJK
//! keywords, same as the type and daypart parsers in `domain`.

use std::sync::LazyLock;

use regex::Regex;

/// Strict shorthand slots.
pub static DATE_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
pub static CLOCK_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());

/// Route extraction patterns, tried in order.
pub struct RoutePatterns {
    /// "from A to B"
    pub from_to_en: Regex,
    /// "A to B", "A toward B", "A until B"
    pub to_en: Regex,
    /// 从A到B
    pub from_to_cjk: Regex,
    /// A到B / A至B / A去B
    pub to_cjk: Regex,
}

pub static ROUTE: LazyLock<RoutePatterns> = LazyLock::new(|| RoutePatterns {
    from_to_en: Regex::new(r"(?i)\bfrom\s+([A-Za-z][A-Za-z'\-]*)\s+to\s+([A-Za-z][A-Za-z'\-]*)")
        .unwrap(),
    to_en: Regex::new(
        r"(?i)\b([A-Za-z][A-Za-z'\-]*)\s+(?:to|toward|towards|until)\s+([A-Za-z][A-Za-z'\-]*)",
    )
    .unwrap(),
    from_to_cjk: Regex::new(r"从([一-龥]+)到([一-龥]+)").unwrap(),
    to_cjk: Regex::new(r"([一-龥]+)(?:到|至|去)([一-龥]+)").unwrap(),
});

/// Clock extraction patterns, tried in order.
pub struct ClockPatterns {
    /// "15:30", full-width colon included
    pub colon: Regex,
    /// 3点 / 3时 / 3点30分 (minutes must follow the hour marker directly)
    pub cjk: Regex,
    /// "3 o'clock"
    pub oclock: Regex,
}

pub static CLOCK: LazyLock<ClockPatterns> = LazyLock::new(|| ClockPatterns {
    colon: Regex::new(r"(\d{1,2})[:：](\d{2})").unwrap(),
    cjk: Regex::new(r"(\d{1,2})(?:点|时)(?:(\d{1,2})分?)?").unwrap(),
    oclock: Regex::new(r"(?i)\b(\d{1,2})\s*o'?clock").unwrap(),
});

/// Interpreter replies sometimes arrive wrapped in a markdown code fence.
pub static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());

/// Date/time phrases that bleed into captured city names unless padded
/// with spaces first. Longer phrases first so padding happens once.
pub const TIME_KEYWORDS: &[&str] = &[
    "day after tomorrow",
    "tomorrow",
    "today",
    "tonight",
    "morning",
    "afternoon",
    "evening",
    "night",
    "noon",
    "今天",
    "明天",
    "后天",
    "上午",
    "下午",
    "晚上",
    "凌晨",
    "中午",
    "早上",
    "傍晚",
];

/// Words that shift a 12-hour clock value into the afternoon or evening.
pub const PM_WORDS: &[&str] = &["afternoon", "evening", "tonight", "pm", "p.m.", "下午", "晚上"];

/// Fuzziness markers turning an exact time into an approximate anchor.
pub const APPROX_WORDS: &[&str] = &["around", "or so", "nearby", "左右", "前后", "附近"];

/// Markers identifying a transfer query in free text.
pub const TRANSFER_WORDS: &[&str] = &["transfer", "换乘", "中转"];

/// Surround every date/time keyword with spaces so the route patterns
/// cannot absorb it into a city name.
pub fn pad_time_keywords(text: &str) -> String {
    let mut out = text.to_string();
    for keyword in TIME_KEYWORDS {
        if out.contains(keyword) {
            out = out.replace(keyword, &format!(" {keyword} "));
        }
    }
    out
}

/// Remove date/time keywords and trailing possessive fragments from a
/// captured city name.
pub fn clean_city(raw: &str) -> String {
    let mut city = raw.to_string();
    for keyword in TIME_KEYWORDS {
        city = city.replace(keyword, "");
    }
    // 上海的高铁 -> 上海; Chongqing's -> Chongqing
    if let Some(head) = city.split('的').next() {
        city = head.to_string();
    }
    if let Some(head) = city.strip_suffix("'s") {
        city = head.to_string();
    }
    city.trim().to_string()
}

/// Whether any word from `words` occurs in `text` (case-insensitive).
pub fn contains_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}
