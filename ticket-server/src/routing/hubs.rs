//! Transfer hub selection.
//!
//! Three sources of candidate hubs, strictly prioritized and never merged:
//! a hub the user named explicitly, a curated table of known-good hubs for
//! popular city pairs, and a fixed priority-ordered list of major national
//! hubs as the fallback.

/// Major rail hubs nationwide, in fallback priority order.
pub const MAJOR_HUBS: &[&str] = &[
    "Beijing",
    "Shanghai",
    "Guangzhou",
    "Shenzhen",
    "Hangzhou",
    "Nanjing",
    "Wuhan",
    "Zhengzhou",
    "Xi'an",
    "Chengdu",
    "Chongqing",
    "Changsha",
    "Hefei",
    "Jinan",
    "Tianjin",
    "Shenyang",
    "Harbin",
    "Taiyuan",
    "Lanzhou",
    "Nanchang",
    "Kunming",
    "Fuzhou",
    "Xiamen",
    "Ningbo",
    "Qingdao",
    "Dalian",
    "Guiyang",
];

/// Curated hubs for known city pairs, in preference order.
pub fn curated_hubs(from: &str, to: &str) -> Option<&'static [&'static str]> {
    let hubs: &[&str] = match (from, to) {
        ("Chengdu", "Shanghai") => &["Wuhan", "Zhengzhou", "Nanjing"],
        ("Beijing", "Guangzhou") => &["Zhengzhou", "Wuhan", "Changsha"],
        ("Xi'an", "Shanghai") => &["Zhengzhou", "Hefei"],
        ("Beijing", "Chengdu") => &["Zhengzhou", "Xi'an"],
        ("Guangzhou", "Beijing") => &["Wuhan", "Zhengzhou"],
        ("Shanghai", "Chengdu") => &["Wuhan", "Chongqing"],
        ("Shenzhen", "Beijing") => &["Changsha", "Wuhan", "Zhengzhou"],
        ("Chongqing", "Shanghai") => &["Wuhan", "Hefei"],
        ("Hangzhou", "Chengdu") => &["Wuhan", "Chongqing"],
        ("Chengdu", "Hangzhou") => &["Chongqing", "Wuhan"],
        _ => return None,
    };
    Some(hubs)
}

/// Select candidate hubs for a route.
///
/// Priority: explicit hint (used alone) > curated table > first
/// `max_fallback` major hubs. Exactly one source is used.
pub fn select_hubs(
    from: &str,
    to: &str,
    hint: Option<&str>,
    max_fallback: usize,
) -> Vec<String> {
    if let Some(hub) = hint {
        return vec![hub.to_string()];
    }

    if let Some(hubs) = curated_hubs(from, to) {
        return hubs.iter().map(|h| h.to_string()).collect();
    }

    MAJOR_HUBS
        .iter()
        .take(max_fallback)
        .map(|h| h.to_string())
        .collect()
}

/// Find the first major hub mentioned in free text, if any.
pub fn hub_named_in(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    MAJOR_HUBS
        .iter()
        .find(|hub| lower.contains(&hub.to_lowercase()))
        .copied()
}
