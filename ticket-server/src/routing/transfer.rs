//! Transfer itinerary routing.
//!
//! Composes two direct-segment queries into ranked two-leg itineraries:
//! pick candidate hubs, fetch `from -> hub` (with the original time
//! constraint) and `hub -> to` (unconstrained; continuity is enforced by
//! the pairing step), cross the two lists under the transfer window, then
//! pool across hubs, sort by total duration, and cap the result.

use futures::future::join_all;
use tracing::debug;

use crate::domain::{TimeSpec, TrainQuery, TransferItinerary};
use crate::provider::SegmentSource;

use super::config::RouterConfig;
use super::fetch_filtered;
use super::hubs::select_hubs;

/// Error from transfer routing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Hub selection produced no candidates
    #[error("no transfer hubs available for this route")]
    NoHubs,

    /// No hub yielded a feasible leg pairing
    #[error("no feasible transfer route found")]
    NoFeasibleRoute,
}

/// Transfer router over a segment source.
pub struct TransferRouter<'a, S: SegmentSource> {
    source: &'a S,
    config: &'a RouterConfig,
}

impl<'a, S: SegmentSource + Sync> TransferRouter<'a, S> {
    /// Create a new router.
    pub fn new(source: &'a S, config: &'a RouterConfig) -> Self {
        Self { source, config }
    }

    /// Find ranked transfer itineraries for a query.
    ///
    /// `hub_hint` is a hub the user named explicitly; when present it is
    /// the only hub tried. A hub whose legs fail to fetch or pair is
    /// skipped; the call only errors when every hub comes up empty.
    pub async fn route(
        &self,
        query: &TrainQuery,
        hub_hint: Option<&str>,
    ) -> Result<Vec<TransferItinerary>, RouteError> {
        let hubs = select_hubs(
            &query.from,
            &query.to,
            hub_hint,
            self.config.max_fallback_hubs,
        );
        if hubs.is_empty() {
            return Err(RouteError::NoHubs);
        }

        debug!(from = %query.from, to = %query.to, hubs = ?hubs, "routing transfer query");

        // Hubs are independent; fan out and pool whatever comes back.
        let per_hub = join_all(hubs.iter().map(|hub| self.route_via(query, hub))).await;

        let mut pool: Vec<TransferItinerary> = per_hub.into_iter().flatten().collect();
        pool.sort_by_key(|it| it.total_duration_minutes);
        pool.truncate(self.config.max_results);

        if pool.is_empty() {
            return Err(RouteError::NoFeasibleRoute);
        }
        Ok(pool)
    }

    /// Itineraries through one hub. Failures are logged and swallowed:
    /// a dead hub must not fail the whole query.
    async fn route_via(&self, query: &TrainQuery, hub: &str) -> Vec<TransferItinerary> {
        let (first, second) = tokio::join!(
            fetch_filtered(
                self.source,
                query.train_type,
                &query.from,
                hub,
                query.date,
                &query.time,
            ),
            fetch_filtered(
                self.source,
                query.train_type,
                hub,
                &query.to,
                query.date,
                &TimeSpec::Unconstrained,
            ),
        );

        let first = match first {
            Ok(segments) => segments,
            Err(e) => {
                debug!(hub, error = %e, "first leg fetch failed, skipping hub");
                return Vec::new();
            }
        };
        let second = match second {
            Ok(segments) => segments,
            Err(e) => {
                debug!(hub, error = %e, "second leg fetch failed, skipping hub");
                return Vec::new();
            }
        };

        if first.is_empty() || second.is_empty() {
            debug!(
                hub,
                first = first.len(),
                second = second.len(),
                "hub has an empty leg, skipping"
            );
            return Vec::new();
        }

        let mut itineraries = Vec::new();
        for leg1 in &first {
            for leg2 in &second {
                if let Some(it) = TransferItinerary::pair(
                    leg1,
                    leg2,
                    hub,
                    self.config.min_transfer_mins,
                    self.config.max_transfer_mins,
                ) {
                    itineraries.push(it);
                }
            }
        }

        debug!(hub, count = itineraries.len(), "hub pairing complete");
        itineraries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClockTime, Fare, Segment, TrainType};
    use chrono::NaiveDate;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
    }

    fn seg(train_no: &str, from: &str, to: &str, dep: &str, arr: &str, run: &str) -> Segment {
        Segment {
            train_no: train_no.to_string(),
            train_type: TrainType::HighSpeed,
            from_station: from.to_string(),
            to_station: to.to_string(),
            departure: ClockTime::parse(dep).ok(),
            arrival: ClockTime::parse(arr).ok(),
            run_time: run.to_string(),
            fares: vec![Fare {
                seat_name: "second class".to_string(),
                price: Some(100.0),
                inventory: 10,
                bookable: true,
            }],
        }
    }

    /// Mock segment source for testing.
    struct MockSource {
        segments: HashMap<(String, String), Vec<Segment>>,
        failures: HashSet<(String, String)>,
        call_count: Mutex<usize>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                segments: HashMap::new(),
                failures: HashSet::new(),
                call_count: Mutex::new(0),
            }
        }

        fn add_route(&mut self, from: &str, to: &str, segments: Vec<Segment>) {
            self.segments
                .insert((from.to_string(), to.to_string()), segments);
        }

        fn fail_route(&mut self, from: &str, to: &str) {
            self.failures.insert((from.to_string(), to.to_string()));
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    impl SegmentSource for MockSource {
        async fn fetch_segments(
            &self,
            _train_type: TrainType,
            from: &str,
            to: &str,
            _date: NaiveDate,
        ) -> Result<Vec<Segment>, crate::provider::ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            let key = (from.to_string(), to.to_string());
            if self.failures.contains(&key) {
                return Err(crate::provider::ProviderError::Unavailable);
            }
            Ok(self.segments.get(&key).cloned().unwrap_or_default())
        }
    }

    fn query() -> TrainQuery {
        TrainQuery::new(
            TrainType::HighSpeed,
            "Chengdu",
            "Shanghai",
            date(),
            TimeSpec::Unconstrained,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn curated_hubs_tried_and_pooled() {
        let mut source = MockSource::new();
        // Chengdu -> Shanghai curated hubs: Wuhan, Zhengzhou, Nanjing
        source.add_route(
            "Chengdu",
            "Wuhan",
            vec![seg("G1", "Chengdu", "Wuhan", "08:00", "12:00", "4h")],
        );
        source.add_route(
            "Wuhan",
            "Shanghai",
            vec![seg("G2", "Wuhan", "Shanghai", "13:00", "17:00", "4h")],
        );
        source.add_route(
            "Chengdu",
            "Zhengzhou",
            vec![seg("G3", "Chengdu", "Zhengzhou", "08:00", "13:00", "5h")],
        );
        source.add_route(
            "Zhengzhou",
            "Shanghai",
            vec![seg("G4", "Zhengzhou", "Shanghai", "14:00", "18:00", "4h")],
        );
        // Nanjing legs absent: hub skipped silently

        let config = RouterConfig::default();
        let router = TransferRouter::new(&source, &config);
        let out = router.route(&query(), None).await.unwrap();

        assert_eq!(out.len(), 2);
        // Sorted ascending by total duration: Wuhan 4+1+4 = 540, Zhengzhou 5+1+4 = 600
        assert_eq!(out[0].transfer_hub, "Wuhan");
        assert_eq!(out[0].total_duration_minutes, 540);
        assert_eq!(out[1].transfer_hub, "Zhengzhou");
        assert_eq!(out[1].total_duration_minutes, 600);

        // Two legs per curated hub
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test]
    async fn explicit_hub_used_alone() {
        let mut source = MockSource::new();
        source.add_route(
            "Chengdu",
            "Hefei",
            vec![seg("G1", "Chengdu", "Hefei", "08:00", "14:00", "6h")],
        );
        source.add_route(
            "Hefei",
            "Shanghai",
            vec![seg("G2", "Hefei", "Shanghai", "15:00", "17:00", "2h")],
        );

        let config = RouterConfig::default();
        let router = TransferRouter::new(&source, &config);
        let out = router.route(&query(), Some("Hefei")).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].transfer_hub, "Hefei");
        // Only the hinted hub was queried
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failed_leg_skips_hub_not_query() {
        let mut source = MockSource::new();
        source.fail_route("Chengdu", "Wuhan");
        source.add_route(
            "Chengdu",
            "Zhengzhou",
            vec![seg("G3", "Chengdu", "Zhengzhou", "08:00", "13:00", "5h")],
        );
        source.add_route(
            "Zhengzhou",
            "Shanghai",
            vec![seg("G4", "Zhengzhou", "Shanghai", "14:00", "18:00", "4h")],
        );

        let config = RouterConfig::default();
        let router = TransferRouter::new(&source, &config);
        let out = router.route(&query(), None).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].transfer_hub, "Zhengzhou");
    }

    #[tokio::test]
    async fn no_pairings_is_no_feasible_route() {
        let mut source = MockSource::new();
        // Legs exist but the change is too tight (10 minutes)
        source.add_route(
            "Chengdu",
            "Wuhan",
            vec![seg("G1", "Chengdu", "Wuhan", "08:00", "12:00", "4h")],
        );
        source.add_route(
            "Wuhan",
            "Shanghai",
            vec![seg("G2", "Wuhan", "Shanghai", "12:10", "16:00", "3h50m")],
        );

        let config = RouterConfig::default();
        let router = TransferRouter::new(&source, &config);
        let err = router.route(&query(), None).await.unwrap_err();
        assert_eq!(err, RouteError::NoFeasibleRoute);
    }

    #[tokio::test]
    async fn results_capped_at_max() {
        let mut source = MockSource::new();
        let first: Vec<Segment> = (0..4)
            .map(|i| {
                seg(
                    &format!("G1{i}"),
                    "Chengdu",
                    "Wuhan",
                    &format!("0{i}:00"),
                    &format!("{:02}:00", 8 + i),
                    "4h",
                )
            })
            .collect();
        let second: Vec<Segment> = (0..4)
            .map(|i| {
                seg(
                    &format!("G2{i}"),
                    "Wuhan",
                    "Shanghai",
                    &format!("{:02}:00", 9 + i),
                    &format!("{:02}:00", 13 + i),
                    "4h",
                )
            })
            .collect();
        source.add_route("Chengdu", "Wuhan", first);
        source.add_route("Wuhan", "Shanghai", second);

        let config = RouterConfig::default();
        let router = TransferRouter::new(&source, &config);
        let out = router.route(&query(), Some("Wuhan")).await.unwrap();

        assert!(out.len() <= config.max_results);
        // Ascending by total duration throughout
        let durations: Vec<i64> = out.iter().map(|it| it.total_duration_minutes).collect();
        assert!(durations.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn time_constraint_applies_to_first_leg_only() {
        let mut source = MockSource::new();
        // First leg at 07:00 is more than 30 min before the requested 09:00
        // and must be filtered out; the 09:00 one stays.
        source.add_route(
            "Chengdu",
            "Wuhan",
            vec![
                seg("G1", "Chengdu", "Wuhan", "07:00", "11:00", "4h"),
                seg("G2", "Chengdu", "Wuhan", "09:00", "13:00", "4h"),
            ],
        );
        // Second leg departs 14:00; unconstrained despite the 09:00 request.
        source.add_route(
            "Wuhan",
            "Shanghai",
            vec![seg("G3", "Wuhan", "Shanghai", "14:00", "18:00", "4h")],
        );

        let mut q = query();
        q.time = TimeSpec::Exact(ClockTime::parse("09:00").unwrap());

        let config = RouterConfig::default();
        let router = TransferRouter::new(&source, &config);
        let out = router.route(&q, Some("Wuhan")).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].first_leg.train_no, "G2");
        assert_eq!(out[0].transfer_minutes, 60);
    }
}
