//! Canonical resolved queries.

use std::fmt;

use chrono::NaiveDate;

use super::time::ClockTime;
use super::train_type::TrainType;

/// Error returned when constructing an invalid query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Origin and destination are the same station
    #[error("origin and destination must differ")]
    SameStation,

    /// Origin or destination is empty
    #[error("origin and destination must be non-empty")]
    EmptyStation,
}

/// A coarse named time-of-day range.
///
/// The windows are fixed and intentionally overlapping (afternoon reaches
/// into dusk, dusk into night); whichever label the normalizer picked is
/// authoritative for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Daypart {
    Morning,
    Noon,
    Afternoon,
    Dusk,
    Night,
}

impl Daypart {
    /// Parse a daypart label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "上午" | "早上" => Some(Daypart::Morning),
            "noon" | "midday" | "中午" => Some(Daypart::Noon),
            "afternoon" | "下午" => Some(Daypart::Afternoon),
            "dusk" | "evening" | "傍晚" => Some(Daypart::Dusk),
            "night" | "tonight" | "晚上" => Some(Daypart::Night),
            _ => None,
        }
    }

    /// The canonical label used in shorthand queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Daypart::Morning => "morning",
            Daypart::Noon => "noon",
            Daypart::Afternoon => "afternoon",
            Daypart::Dusk => "dusk",
            Daypart::Night => "night",
        }
    }

    /// The inclusive departure-time window for this daypart.
    pub fn window(&self) -> (ClockTime, ClockTime) {
        let t = |h, m| ClockTime::new(h, m).expect("static window bounds");
        match self {
            Daypart::Morning => (t(6, 0), t(12, 0)),
            Daypart::Noon => (t(11, 0), t(13, 0)),
            Daypart::Afternoon => (t(12, 0), t(18, 0)),
            Daypart::Dusk => (t(17, 0), t(19, 0)),
            Daypart::Night => (t(18, 0), t(23, 59)),
        }
    }

    /// Whether a departure clock falls within this daypart's window.
    pub fn contains(&self, clock: ClockTime) -> bool {
        let (start, end) = self.window();
        start <= clock && clock <= end
    }
}

impl fmt::Display for Daypart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time constraint attached to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// No time constraint; the full day matches.
    Unconstrained,

    /// Departures not more than 30 minutes before this clock, no upper bound.
    Exact(ClockTime),

    /// Departures within 30 minutes either side of this anchor.
    Around(ClockTime),

    /// Departures within a fixed daypart window.
    Daypart(Daypart),
}

impl TimeSpec {
    /// Whether any time comparison applies.
    pub fn is_constrained(&self) -> bool {
        !matches!(self, TimeSpec::Unconstrained)
    }
}

/// A canonical resolved ticket query.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainQuery {
    pub train_type: TrainType,
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub time: TimeSpec,
}

impl TrainQuery {
    /// Construct a query, enforcing that origin and destination are
    /// distinct, non-empty stations.
    pub fn new(
        train_type: TrainType,
        from: impl Into<String>,
        to: impl Into<String>,
        date: NaiveDate,
        time: TimeSpec,
    ) -> Result<Self, QueryError> {
        let from = from.into();
        let to = to.into();
        if from.is_empty() || to.is_empty() {
            return Err(QueryError::EmptyStation);
        }
        if from == to {
            return Err(QueryError::SameStation);
        }
        Ok(Self {
            train_type,
            from,
            to,
            date,
            time,
        })
    }

    /// Render the canonical shorthand form: `type from to date [time]`.
    ///
    /// Approximate queries render their anchor as a plain clock value; the
    /// fuzziness marker has no shorthand syntax.
    pub fn shorthand(&self) -> String {
        let mut s = format!(
            "{} {} {} {}",
            self.train_type.as_str(),
            self.from,
            self.to,
            self.date.format("%Y-%m-%d")
        );
        match self.time {
            TimeSpec::Unconstrained => {}
            TimeSpec::Exact(t) | TimeSpec::Around(t) => {
                s.push(' ');
                s.push_str(&t.to_string());
            }
            TimeSpec::Daypart(d) => {
                s.push(' ');
                s.push_str(d.as_str());
            }
        }
        s
    }
}
