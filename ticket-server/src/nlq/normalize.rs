//! Query normalization.
//!
//! Turns raw text into a canonical [`TrainQuery`]. Structured shorthand is
//! parsed positionally; anything else goes to the interpretation service
//! first and falls back to deterministic pattern rules when the service is
//! unconfigured, unreachable, or returns something unusable. Exactly one
//! interpreter attempt per query, never more.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{ClockTime, Daypart, TimeSpec, TrainQuery, TrainType};
use crate::routing::hubs::MAJOR_HUBS;

use super::interpreter::{Interpreter, unwrap_code_fence};
use super::patterns::{
    APPROX_WORDS, CLOCK, CLOCK_SLOT, DATE_SLOT, PM_WORDS, ROUTE, TRANSFER_WORDS, clean_city,
    contains_any, pad_time_keywords,
};
use super::relative_date;

/// Error returned when no usable query can be extracted from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NlqError {
    /// No route could be extracted
    #[error("could not extract a route from the query text")]
    Unparseable,
}

/// A transfer request peeled off the raw turn text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// The query text with transfer markers and hub phrase removed.
    pub rest: String,

    /// Hub the user named explicitly, if any.
    pub hub_hint: Option<String>,
}

/// Resolve raw text into a canonical query.
///
/// Shorthand short-circuits everything. For natural language the
/// interpreter (when present) is asked to emit the same shorthand; its
/// reply gets a local date repair before being trusted. Any interpreter
/// failure degrades silently to [`fallback_parse`].
pub async fn normalize<I: Interpreter + Sync>(
    text: &str,
    today: NaiveDate,
    interpreter: Option<&I>,
) -> Result<TrainQuery, NlqError> {
    if let Some(query) = parse_shorthand(text, today) {
        return Ok(query);
    }

    if let Some(interp) = interpreter {
        match interp.interpret(&parse_prompt(text, today)).await {
            Ok(reply) => {
                if let Some(query) = parse_interpreter_reply(&reply, text, today) {
                    return Ok(query);
                }
                debug!(%reply, "interpreter reply unusable, falling back to patterns");
            }
            Err(e) => debug!(error = %e, "interpreter failed, falling back to patterns"),
        }
    }

    fallback_parse(text, today)
}

/// Parse the structured shorthand `type origin destination [date] [time]`.
///
/// Slots after the stations may arrive in either order; the date defaults
/// to `today`, a missing time means the whole day. The time slot accepts a
/// clock value or a daypart label. Returns None when the text is not
/// shorthand at all (unknown leading type, too few tokens, a token that
/// fits no slot), which sends the caller down the natural-language path.
pub fn parse_shorthand(text: &str, today: NaiveDate) -> Option<TrainQuery> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 3 || parts.len() > 5 {
        return None;
    }

    let train_type = TrainType::parse(parts[0])?;
    let from = parts[1];
    let to = parts[2];

    let mut date = today;
    let mut time = TimeSpec::Unconstrained;
    for part in &parts[3..] {
        if DATE_SLOT.is_match(part) {
            date = NaiveDate::parse_from_str(part, "%Y-%m-%d").ok()?;
        } else if CLOCK_SLOT.is_match(part) {
            time = TimeSpec::Exact(ClockTime::parse(part).ok()?);
        } else if let Some(daypart) = Daypart::parse(part) {
            time = TimeSpec::Daypart(daypart);
        } else {
            return None;
        }
    }

    TrainQuery::new(train_type, from, to, date, time).ok()
}

/// Deterministic pattern rules for natural-language text.
pub fn fallback_parse(text: &str, today: NaiveDate) -> Result<TrainQuery, NlqError> {
    let train_type = extract_type(text);
    let (from, to) = extract_route(text).ok_or(NlqError::Unparseable)?;
    let date = relative_date::find_in_text(text, today).unwrap_or(today);
    let time = extract_time(text);

    TrainQuery::new(train_type, from, to, date, time).map_err(|_| NlqError::Unparseable)
}

/// Service type from keyword presence; everything unmarked is ordinary.
fn extract_type(text: &str) -> TrainType {
    let lower = text.to_lowercase();
    if lower.contains("high-speed") || lower.contains("high speed") || lower.contains("高铁") {
        TrainType::HighSpeed
    } else if lower.contains("inter-city")
        || lower.contains("intercity")
        || lower.contains("动车")
    {
        TrainType::InterCity
    } else {
        TrainType::Ordinary
    }
}

/// Extract origin and destination city names.
fn extract_route(text: &str) -> Option<(String, String)> {
    let padded = pad_time_keywords(text);

    let caps = ROUTE
        .from_to_en
        .captures(&padded)
        .or_else(|| ROUTE.from_to_cjk.captures(&padded))
        .or_else(|| ROUTE.to_en.captures(&padded))
        .or_else(|| ROUTE.to_cjk.captures(&padded))?;

    let from = clean_city(&caps[1]);
    let to = clean_city(&caps[2]);
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}

/// Extract the time constraint: an explicit clock (12h-corrected when an
/// afternoon/evening word is present), else a daypart default, else none.
/// A fuzziness word turns the extracted clock into an approximate anchor.
fn extract_time(text: &str) -> TimeSpec {
    let anchor = extract_clock(text).or_else(|| daypart_default(text));

    match anchor {
        Some(clock) if contains_any(text, APPROX_WORDS) => TimeSpec::Around(clock),
        Some(clock) => TimeSpec::Exact(clock),
        None => TimeSpec::Unconstrained,
    }
}

fn extract_clock(text: &str) -> Option<ClockTime> {
    let (hour, minute) = if let Some(caps) = CLOCK.colon.captures(text) {
        (caps[1].parse::<u8>().ok()?, caps[2].parse::<u8>().ok()?)
    } else if let Some(caps) = CLOCK.cjk.captures(text) {
        let minute = caps
            .get(2)
            .map_or(Some(0), |m| m.as_str().parse::<u8>().ok())?;
        (caps[1].parse::<u8>().ok()?, minute)
    } else if let Some(caps) = CLOCK.oclock.captures(text) {
        (caps[1].parse::<u8>().ok()?, 0)
    } else {
        return None;
    };

    let hour = if hour < 12 && contains_any(text, PM_WORDS) {
        hour + 12
    } else {
        hour
    };

    ClockTime::new(hour, minute).ok()
}

/// Fixed clock defaults for daypart words, in the original precedence:
/// morning, then afternoon unless an evening word is also present, then
/// evening.
fn daypart_default(text: &str) -> Option<ClockTime> {
    let lower = text.to_lowercase();
    let morning = lower.contains("morning") || lower.contains("上午") || lower.contains("早上");
    let afternoon = lower.contains("afternoon") || lower.contains("下午");
    let evening = lower.contains("evening")
        || lower.contains("tonight")
        || lower.contains("晚上")
        || lower.contains("傍晚");

    let clock = |h| ClockTime::new(h, 0).expect("static daypart default");
    if morning {
        Some(clock(9))
    } else if afternoon && !evening {
        Some(clock(14))
    } else if evening {
        Some(clock(19))
    } else {
        None
    }
}

/// Validate and repair an interpreter reply before trusting it.
///
/// The reply should already be shorthand. When its date slot is not a
/// `YYYY-MM-DD` value (the service echoed "tomorrow" back), the date is
/// re-resolved locally from the original query text before giving up.
fn parse_interpreter_reply(reply: &str, original: &str, today: NaiveDate) -> Option<TrainQuery> {
    let reply = unwrap_code_fence(reply);
    let mut parts: Vec<String> = reply.split_whitespace().map(str::to_string).collect();

    if parts.len() >= 4 && !DATE_SLOT.is_match(&parts[3]) && !CLOCK_SLOT.is_match(&parts[3]) {
        let repaired = relative_date::find_in_text(original, today).unwrap_or(today);
        debug!(date = %repaired, "repaired interpreter date slot");
        parts[3] = repaired.format("%Y-%m-%d").to_string();
    }

    parse_shorthand(&parts.join(" "), today)
}

/// Build the parse prompt for the interpretation service.
fn parse_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        "Analyze this rail ticket query and extract its parameters: \"{text}\"\n\
         \n\
         Reply with exactly one line in this form, nothing else:\n\
         type origin destination date [time]\n\
         \n\
         type is one of: high-speed, inter-city, ordinary.\n\
         date must be YYYY-MM-DD, resolved with this table:\n\
         {table}\n\
         time is HH:MM, 24-hour, only when the query names one.\n\
         \n\
         Examples:\n\
         query: \"tomorrow's high-speed from Shanghai to Beijing\"\n\
         reply: high-speed Shanghai Beijing {tomorrow}\n\
         query: \"inter-city Chengdu to Chongqing day after tomorrow at 3pm\"\n\
         reply: inter-city Chengdu Chongqing {day_after} 15:00\n",
        table = relative_date::date_table(today),
        tomorrow = (today + chrono::Days::new(1)).format("%Y-%m-%d"),
        day_after = (today + chrono::Days::new(2)).format("%Y-%m-%d"),
    )
}

/// Whether text reads as a ticket query at all.
///
/// Asks the interpreter for a yes/no when available, else the keyword
/// heuristic: a service-type word plus a direction word.
pub async fn is_ticket_query<I: Interpreter + Sync>(text: &str, interpreter: Option<&I>) -> bool {
    if let Some(interp) = interpreter {
        let prompt = format!(
            "Is the following text a rail ticket availability query? \
             Answer with exactly one word, yes or no.\n\"{text}\""
        );
        match interp.interpret(&prompt).await {
            Ok(reply) => {
                let reply = reply.trim().to_lowercase();
                if reply.starts_with("yes") {
                    return true;
                }
                if reply.starts_with("no") {
                    return false;
                }
                debug!(%reply, "unusable classification reply, using heuristic");
            }
            Err(e) => debug!(error = %e, "classification failed, using heuristic"),
        }
    }
    looks_like_ticket_query(text)
}

/// Keyword heuristic for classification.
pub fn looks_like_ticket_query(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_type = ["high-speed", "high speed", "inter-city", "intercity", "train", "ticket"]
        .iter()
        .any(|w| lower.contains(w))
        || ["高铁", "动车", "普通"].iter().any(|w| text.contains(w));
    let has_direction = [" to ", "from "].iter().any(|w| lower.contains(w))
        || ["到", "去", "至"].iter().any(|w| text.contains(w));
    has_type && has_direction
}

/// Detect a transfer request and peel its markers off.
///
/// Matches the `transfer+` prefixed shorthand or free text containing a
/// transfer keyword. An explicitly named known hub ("via Wuhan",
/// "transfer at Zhengzhou") becomes the hub hint and is removed so route
/// extraction cannot mistake it for an endpoint.
pub fn detect_transfer(text: &str) -> Option<TransferRequest> {
    let rest = if let Some(stripped) = text.strip_prefix("transfer+") {
        stripped.trim().to_string()
    } else if let Some(stripped) = text.strip_prefix("中转+") {
        stripped.trim().to_string()
    } else if contains_any(text, TRANSFER_WORDS) {
        text.to_string()
    } else {
        return None;
    };

    let (rest, hub_hint) = extract_hub_hint(&rest);
    Some(TransferRequest { rest, hub_hint })
}

/// Find an explicitly named hub and remove its phrase from the text.
fn extract_hub_hint(text: &str) -> (String, Option<String>) {
    let lower = text.to_lowercase();
    for hub in MAJOR_HUBS {
        let hub_lower = hub.to_lowercase();
        let phrases = [
            format!("transferring at {hub_lower}"),
            format!("transfer at {hub_lower}"),
            format!("through {hub_lower}"),
            format!("via {hub_lower}"),
            format!("从{hub_lower}中转"),
            format!("在{hub_lower}中转"),
            format!("通过{hub_lower}"),
            format!("经{hub_lower}"),
        ];
        for phrase in &phrases {
            let Some(pos) = lower.find(phrase.as_str()) else {
                continue;
            };
            // Offsets in the lowercased text line up with the original
            // for ASCII and CJK; anything else falls through untouched.
            if let (Some(head), Some(tail)) = (text.get(..pos), text.get(pos + phrase.len()..)) {
                let rest = format!("{head}{tail}");
                return (rest.trim().to_string(), Some((*hub).to_string()));
            }
        }
    }
    (text.to_string(), None)
}
