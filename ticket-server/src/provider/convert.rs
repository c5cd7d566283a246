//! Conversion from provider DTOs to domain types.
//!
//! The provider is tolerated, not trusted: unparseable clock fields become
//! `None` (the entry is kept), loosely-typed fare values are coerced, and
//! records with an unrecognizable service type are skipped since no query
//! could ever match them.

use serde_json::Value;
use tracing::debug;

use crate::domain::{ClockTime, Fare, Segment, TrainType};

use super::types::{RawFare, RawSegment};

/// Convert raw records into domain segments.
pub fn convert_segments(raw: Vec<RawSegment>) -> Vec<Segment> {
    raw.into_iter().filter_map(convert_segment).collect()
}

fn convert_segment(raw: RawSegment) -> Option<Segment> {
    let train_no = raw.trainumber.unwrap_or_default();

    let train_type = match raw.traintype.as_deref().and_then(TrainType::parse) {
        Some(ty) => ty,
        None => {
            debug!(train = %train_no, "skipping record with unrecognized service type");
            return None;
        }
    };

    let departure = raw.departtime.as_deref().and_then(parse_clock_lenient);
    let arrival = raw.arrivetime.as_deref().and_then(parse_clock_lenient);

    let fares = raw
        .ticket_info
        .unwrap_or_default()
        .into_iter()
        .map(convert_fare)
        .collect();

    Some(Segment {
        train_no,
        train_type,
        from_station: raw.departstation.unwrap_or_default(),
        to_station: raw.arrivestation.unwrap_or_default(),
        departure,
        arrival,
        run_time: raw.runtime.unwrap_or_default(),
        fares,
    })
}

fn parse_clock_lenient(s: &str) -> Option<ClockTime> {
    match ClockTime::parse(s.trim()) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(value = s, error = %e, "malformed clock field kept as missing");
            None
        }
    }
}

fn convert_fare(raw: RawFare) -> Fare {
    Fare {
        seat_name: raw.seatname.unwrap_or_default(),
        price: raw.seatprice.as_ref().and_then(value_as_f64),
        inventory: raw
            .seatinventory
            .as_ref()
            .and_then(value_as_u32)
            .unwrap_or(0),
        bookable: raw.bookable.as_ref().is_some_and(value_as_bool),
    }
}

/// Coerce a number-or-numeric-string value to f64.
fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a number-or-numeric-string value to u32.
fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret the provider's bookability flag: a boolean, a non-zero number,
/// or an affirmative label.
fn value_as_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("yes")
                || s.eq_ignore_ascii_case("true")
                || s.eq_ignore_ascii_case("available")
                || s == "有车票"
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(body: &str) -> RawSegment {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn full_record_converts() {
        let seg = convert_segment(raw(
            r#"{
                "trainumber": "G100",
                "traintype": "high-speed",
                "departstation": "Beijing",
                "arrivestation": "Shanghai",
                "departtime": "09:00",
                "arrivetime": "13:30",
                "runtime": "4h30m",
                "ticket_info": [
                    {"seatname": "second class", "seatprice": "553", "seatinventory": "99", "bookable": "yes"}
                ]
            }"#,
        ))
        .unwrap();

        assert_eq!(seg.train_no, "G100");
        assert_eq!(seg.train_type, TrainType::HighSpeed);
        assert_eq!(seg.departure.unwrap().to_string(), "09:00");
        assert_eq!(seg.fares[0].price, Some(553.0));
        assert_eq!(seg.fares[0].inventory, 99);
        assert!(seg.fares[0].bookable);
    }

    #[test]
    fn malformed_clock_kept_as_none() {
        let seg = convert_segment(raw(
            r#"{"trainumber": "G1", "traintype": "high-speed", "departtime": "9am", "arrivetime": "13:30"}"#,
        ))
        .unwrap();
        assert!(seg.departure.is_none());
        assert!(seg.arrival.is_some());
    }

    #[test]
    fn unknown_type_skipped() {
        assert!(convert_segment(raw(r#"{"trainumber": "X1", "traintype": "maglev"}"#)).is_none());
        assert!(convert_segment(raw(r#"{"trainumber": "X1"}"#)).is_none());
    }

    #[test]
    fn fare_coercions() {
        let seg = convert_segment(raw(
            r#"{
                "trainumber": "D2", "traintype": "inter-city",
                "ticket_info": [
                    {"seatname": "a", "seatprice": 12.5, "seatinventory": 3, "bookable": true},
                    {"seatname": "b", "seatprice": "not a number", "bookable": 0},
                    {"seatname": "c", "bookable": "有车票"}
                ]
            }"#,
        ))
        .unwrap();

        assert_eq!(seg.fares[0].price, Some(12.5));
        assert!(seg.fares[0].bookable);
        assert_eq!(seg.fares[1].price, None);
        assert!(!seg.fares[1].bookable);
        assert_eq!(seg.fares[2].inventory, 0);
        assert!(seg.fares[2].bookable);
    }
}
