//! Direct travel segments and their fares.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::time::ClockTime;
use super::train_type::TrainType;

/// The fare class used as the price reference for itinerary totals.
const REFERENCE_SEAT: &str = "second class";

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:小时|hours?|hrs?|h)").unwrap());
static MINS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:分钟|minutes?|mins?|m)").unwrap());

/// One seat class on a segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fare {
    /// Seat class name as reported by the provider.
    pub seat_name: String,

    /// Price; None when the provider reports the class without a price.
    pub price: Option<f64>,

    /// Remaining inventory.
    pub inventory: u32,

    /// Whether the class is currently bookable.
    pub bookable: bool,
}

impl Fare {
    /// Whether this is the second-class reference fare.
    fn is_reference(&self) -> bool {
        let name = self.seat_name.trim();
        name.eq_ignore_ascii_case(REFERENCE_SEAT)
            || name.eq_ignore_ascii_case("second-class")
            || name == "二等座"
    }
}

/// One direct travel offering between two stations.
///
/// Immutable once fetched. Departure and arrival are `None` when the
/// provider sent a malformed clock field; such entries are kept rather than
/// dropped, and only excluded where a time comparison actually needs the
/// missing value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Train number, e.g. "G1234".
    pub train_no: String,

    /// Normalized service type.
    pub train_type: TrainType,

    /// Origin station name.
    pub from_station: String,

    /// Destination station name.
    pub to_station: String,

    /// Departure clock time, if parseable.
    pub departure: Option<ClockTime>,

    /// Arrival clock time, if parseable.
    pub arrival: Option<ClockTime>,

    /// Raw run-time string, e.g. "4h31m" or "4 hours 31 minutes".
    pub run_time: String,

    /// Fares in provider order.
    pub fares: Vec<Fare>,
}

impl Segment {
    /// The fare used for total-price calculations.
    ///
    /// Prefers the second-class fare; if absent, the first fare with a
    /// price. Returns None when no fare on the segment is priced.
    pub fn reference_fare(&self) -> Option<&Fare> {
        self.fares
            .iter()
            .find(|f| f.is_reference() && f.price.is_some())
            .or_else(|| self.fares.iter().find(|f| f.price.is_some()))
    }

    /// The reference fare price, or 0 when the segment has no priced fare.
    pub fn reference_price(&self) -> f64 {
        self.reference_fare()
            .and_then(|f| f.price)
            .unwrap_or(0.0)
    }

    /// Run time in minutes, parsed from the provider's "H hours M minutes"
    /// style string. Missing components default to 0.
    pub fn duration_minutes(&self) -> i64 {
        parse_run_time(&self.run_time)
    }
}

/// Parse a run-time string into minutes.
///
/// Accepts "4h31m", "4 hours 31 minutes", "4小时31分钟", "45m", "2h".
pub fn parse_run_time(s: &str) -> i64 {
    let hours = HOURS_RE
        .captures(s)
        .and_then(|c| c[1].parse::<i64>().ok())
        .unwrap_or(0);
    let minutes = MINS_RE
        .captures(s)
        .and_then(|c| c[1].parse::<i64>().ok())
        .unwrap_or(0);
    hours * 60 + minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fare(name: &str, price: Option<f64>) -> Fare {
        Fare {
            seat_name: name.to_string(),
            price,
            inventory: 10,
            bookable: true,
        }
    }

    fn segment_with_fares(fares: Vec<Fare>) -> Segment {
        Segment {
            train_no: "G100".to_string(),
            train_type: TrainType::HighSpeed,
            from_station: "Beijing".to_string(),
            to_station: "Shanghai".to_string(),
            departure: ClockTime::parse("09:00").ok(),
            arrival: ClockTime::parse("13:30").ok(),
            run_time: "4h30m".to_string(),
            fares,
        }
    }

    #[test]
    fn run_time_formats() {
        assert_eq!(parse_run_time("4h31m"), 271);
        assert_eq!(parse_run_time("4 hours 31 minutes"), 271);
        assert_eq!(parse_run_time("4小时31分钟"), 271);
        assert_eq!(parse_run_time("45m"), 45);
        assert_eq!(parse_run_time("2h"), 120);
        assert_eq!(parse_run_time("1 hour 5 mins"), 65);
        assert_eq!(parse_run_time(""), 0);
        assert_eq!(parse_run_time("unknown"), 0);
    }

    #[test]
    fn reference_fare_prefers_second_class() {
        let seg = segment_with_fares(vec![
            fare("business class", Some(900.0)),
            fare("second class", Some(550.0)),
            fare("first class", Some(750.0)),
        ]);
        assert_eq!(seg.reference_price(), 550.0);
    }

    #[test]
    fn reference_fare_cjk_name() {
        let seg = segment_with_fares(vec![fare("商务座", Some(900.0)), fare("二等座", Some(550.0))]);
        assert_eq!(seg.reference_price(), 550.0);
    }

    #[test]
    fn reference_fare_falls_back_to_first_priced() {
        let seg = segment_with_fares(vec![
            fare("sleeper", None),
            fare("first class", Some(750.0)),
            fare("hard seat", Some(120.0)),
        ]);
        assert_eq!(seg.reference_price(), 750.0);
    }

    #[test]
    fn unpriced_second_class_is_skipped() {
        let seg = segment_with_fares(vec![fare("second class", None), fare("first class", Some(750.0))]);
        assert_eq!(seg.reference_price(), 750.0);
    }

    #[test]
    fn no_priced_fare_is_zero() {
        let seg = segment_with_fares(vec![fare("sleeper", None)]);
        assert_eq!(seg.reference_price(), 0.0);

        let seg = segment_with_fares(vec![]);
        assert_eq!(seg.reference_price(), 0.0);
    }

    #[test]
    fn duration_uses_run_time_string() {
        let seg = segment_with_fares(vec![]);
        assert_eq!(seg.duration_minutes(), 270);
    }
}
