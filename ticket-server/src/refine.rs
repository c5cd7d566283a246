//! Free-text refinement of a result set.
//!
//! A `+instruction` turn narrows or reorders the records of the latest
//! query. When the interpretation service is configured it picks matching
//! record indices from a simplified JSON sample first; any failure falls
//! through to a fixed-priority list of local strategies keyed on literal
//! keyword sets. The last resort is returning the records unfiltered,
//! never an error.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::nlq::{Interpreter, unwrap_code_fence};
use crate::routing::hubs::MAJOR_HUBS;
use crate::session::Record;

/// Most records included in an interpreter sample.
const SAMPLE_LIMIT: usize = 20;

const PRICE_SUPERLATIVES: &[&str] = &[
    "cheapest",
    "lowest price",
    "最便宜",
    "价格最低",
    "总票价最低",
    "最低",
];
const PRICE_WORDS: &[&str] = &["cheap", "price", "fare", "便宜", "低价", "票价"];

const DURATION_SUPERLATIVES: &[&str] = &[
    "fastest",
    "quickest",
    "shortest",
    "最快",
    "时间最短",
    "耗时最少",
];
const DURATION_WORDS: &[&str] = &["duration", "总时长", "时长"];

const TRANSFER_WAIT_WORDS: &[&str] = &["transfer time", "transfer wait", "换乘时间", "中转时间", "等待时间"];
const SHORTEST_WORDS: &[&str] = &["shortest", "least", "最短", "最少"];
const LONGEST_WORDS: &[&str] = &["longest", "most", "最长", "最多"];

const TRAIN_NO_WORDS: &[&str] = &["train", "车次", "班次"];

/// Refine records against an instruction.
///
/// The interpreter path and the local path both always recompute from the
/// records given (the caller hands in the original result set, not the
/// current view).
pub async fn refine<I: Interpreter + Sync>(
    records: &[Record],
    instruction: &str,
    interpreter: Option<&I>,
) -> Vec<Record> {
    if let Some(interp) = interpreter {
        if let Some(selected) = refine_via_interpreter(records, instruction, interp).await {
            return selected;
        }
        debug!("interpreter refinement unusable, using local strategies");
    }
    refine_local(records, instruction)
}

type Strategy = fn(&[Record], &str) -> Option<Vec<Record>>;

/// Local strategies in priority order. The first whose keywords apply
/// decides the result, even an empty one; none applying returns the
/// records unfiltered.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("hub-name", by_hub_name),
    ("price", by_price),
    ("duration", by_duration),
    ("transfer-wait", by_transfer_wait),
    ("train-number", by_train_number),
];

/// Keyword-driven local refinement.
pub fn refine_local(records: &[Record], instruction: &str) -> Vec<Record> {
    for (name, strategy) in STRATEGIES {
        if let Some(out) = strategy(records, instruction) {
            debug!(strategy = *name, kept = out.len(), "local refinement applied");
            return out;
        }
    }
    debug!("no refinement strategy applies, returning records unfiltered");
    records.to_vec()
}

/// Keep itineraries through a hub named in the instruction (exact hub
/// match only). Not applicable to direct-only result sets.
fn by_hub_name(records: &[Record], instruction: &str) -> Option<Vec<Record>> {
    if records.iter().all(|r| r.transfer_hub().is_none()) {
        return None;
    }
    let lower = instruction.to_lowercase();
    let hub = MAJOR_HUBS
        .iter()
        .copied()
        .find(|hub| lower.contains(&hub.to_lowercase()))?;

    Some(
        records
            .iter()
            .filter(|r| r.transfer_hub() == Some(hub))
            .cloned()
            .collect(),
    )
}

/// Cheapest-of or ascending price order.
fn by_price(records: &[Record], instruction: &str) -> Option<Vec<Record>> {
    let superlative = contains_any(instruction, PRICE_SUPERLATIVES);
    if !superlative && !contains_any(instruction, PRICE_WORDS) {
        return None;
    }

    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.price().total_cmp(&b.price()));
    if superlative {
        sorted.truncate(1);
    }
    Some(sorted)
}

/// Fastest-of or ascending total-duration order.
fn by_duration(records: &[Record], instruction: &str) -> Option<Vec<Record>> {
    let superlative = contains_any(instruction, DURATION_SUPERLATIVES);
    if !superlative && !contains_any(instruction, DURATION_WORDS) {
        return None;
    }

    let mut sorted = records.to_vec();
    sorted.sort_by_key(Record::duration_minutes);
    if superlative {
        sorted.truncate(1);
    }
    Some(sorted)
}

/// Extremum of the wait at the hub. Only meaningful for itineraries;
/// direct segments are dropped from the result.
fn by_transfer_wait(records: &[Record], instruction: &str) -> Option<Vec<Record>> {
    if !contains_any(instruction, TRANSFER_WAIT_WORDS) {
        return None;
    }

    let mut transfers: Vec<Record> = records
        .iter()
        .filter(|r| r.transfer_minutes().is_some())
        .cloned()
        .collect();

    if contains_any(instruction, LONGEST_WORDS) {
        transfers.sort_by_key(|r| std::cmp::Reverse(r.transfer_minutes().unwrap_or(0)));
        transfers.truncate(1);
    } else {
        transfers.sort_by_key(|r| r.transfer_minutes().unwrap_or(0));
        if contains_any(instruction, SHORTEST_WORDS) {
            transfers.truncate(1);
        }
    }
    Some(transfers)
}

/// Keep records whose train number appears in the instruction. Applies
/// when a train-number keyword is present, or when the instruction
/// literally names a train in the set.
fn by_train_number(records: &[Record], instruction: &str) -> Option<Vec<Record>> {
    let upper = instruction.to_uppercase();
    let matched: Vec<Record> = records
        .iter()
        .filter(|r| {
            r.train_numbers()
                .iter()
                .any(|no| !no.is_empty() && upper.contains(&no.to_uppercase()))
        })
        .cloned()
        .collect();

    if !matched.is_empty() {
        return Some(matched);
    }
    if contains_any(instruction, TRAIN_NO_WORDS) {
        return Some(matched);
    }
    None
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

#[derive(Deserialize)]
struct SelectionReply {
    #[serde(default)]
    matched_indices: Vec<usize>,
}

/// Ask the interpreter to select matching indices from a sample.
///
/// Returns None whenever the reply is unusable or selects nothing, which
/// sends the caller to the local strategies. The selection is re-sorted
/// locally when the instruction carries price or duration wording, so a
/// "cheapest" request stays a singleton even if the service returned
/// several indices.
async fn refine_via_interpreter<I: Interpreter + Sync>(
    records: &[Record],
    instruction: &str,
    interpreter: &I,
) -> Option<Vec<Record>> {
    let sample: Vec<serde_json::Value> = records
        .iter()
        .take(SAMPLE_LIMIT)
        .enumerate()
        .map(|(index, record)| simplify(index, record))
        .collect();
    if sample.len() < records.len() {
        debug!(
            sampled = sample.len(),
            total = records.len(),
            "refinement sample truncated"
        );
    }

    let prompt = format!(
        "Select the rail results matching this instruction: \"{instruction}\"\n\
         \n\
         Results as JSON (index identifies each):\n\
         {sample}\n\
         \n\
         Reply with JSON only, no other text:\n\
         {{\"matched_indices\": [0, 2]}}\n\
         \n\
         total_price is the full fare, total_duration_minutes the full\n\
         travel time, transfer_minutes the wait at the hub; a named hub\n\
         matches only on equality.",
        sample = serde_json::to_string(&sample).ok()?,
    );

    let reply = interpreter.interpret(&prompt).await.ok()?;
    let parsed: SelectionReply = serde_json::from_str(unwrap_code_fence(&reply).as_str()).ok()?;

    let selected: Vec<Record> = parsed
        .matched_indices
        .into_iter()
        .filter(|&i| i < records.len())
        .map(|i| records[i].clone())
        .collect();
    if selected.is_empty() {
        return None;
    }

    Some(post_sort(selected, instruction))
}

/// Price/duration wording re-sorts the interpreter's selection.
fn post_sort(mut selected: Vec<Record>, instruction: &str) -> Vec<Record> {
    if contains_any(instruction, PRICE_SUPERLATIVES) || contains_any(instruction, PRICE_WORDS) {
        selected.sort_by(|a, b| a.price().total_cmp(&b.price()));
        if contains_any(instruction, PRICE_SUPERLATIVES) {
            selected.truncate(1);
        }
    } else if contains_any(instruction, DURATION_SUPERLATIVES)
        || contains_any(instruction, DURATION_WORDS)
    {
        selected.sort_by_key(Record::duration_minutes);
        if contains_any(instruction, DURATION_SUPERLATIVES) {
            selected.truncate(1);
        }
    }
    selected
}

/// Compact JSON view of one record for the interpreter sample.
fn simplify(index: usize, record: &Record) -> serde_json::Value {
    match record {
        Record::Direct(seg) => json!({
            "index": index,
            "kind": "direct",
            "train_no": seg.train_no,
            "train_type": seg.train_type,
            "from": seg.from_station,
            "to": seg.to_station,
            "departure": seg.departure,
            "arrival": seg.arrival,
            "total_price": seg.reference_price(),
            "total_duration_minutes": seg.duration_minutes(),
            "fares": seg.fares.iter().take(2).map(|f| json!({
                "seat": f.seat_name,
                "price": f.price,
                "inventory": f.inventory,
            })).collect::<Vec<_>>(),
        }),
        Record::Transfer(it) => json!({
            "index": index,
            "kind": "transfer",
            "transfer_hub": it.transfer_hub,
            "transfer_minutes": it.transfer_minutes,
            "total_price": it.total_price,
            "total_duration_minutes": it.total_duration_minutes,
            "first_leg": {
                "train_no": it.first_leg.train_no,
                "departure": it.first_leg.departure,
                "arrival": it.first_leg.arrival,
            },
            "second_leg": {
                "train_no": it.second_leg.train_no,
                "departure": it.second_leg.departure,
                "arrival": it.second_leg.arrival,
            },
        }),
    }
}
