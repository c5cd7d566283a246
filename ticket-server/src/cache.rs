//! Caching layer for ticket provider responses.
//!
//! Transfer routing fans out over several hubs and a refined query can be
//! re-issued within seconds, so the same `(type, from, to, date)` request
//! repeats often. The cache sits behind the `SegmentSource` trait, making
//! cached and uncached sources interchangeable for the router and the
//! turn engine.
//!
//! A short TTL keeps inventory counts reasonably fresh. Failed fetches
//! are not cached; a flaky provider answer should not poison the key.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache as MokaCache;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Segment, TrainType};
use crate::provider::{ProviderError, SegmentSource};

/// Cache key: one provider request.
type SegmentKey = (TrainType, String, String, NaiveDate);

/// Configuration for the segment cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached entries, seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of cached entries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_ttl_secs() -> u64 {
    120
}

fn default_max_capacity() -> u64 {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

/// A segment source with a moka cache in front of it.
pub struct CachedSegmentSource<S> {
    inner: S,
    cache: MokaCache<SegmentKey, Arc<Vec<Segment>>>,
}

impl<S> CachedSegmentSource<S> {
    /// Wrap a source with a cache.
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .max_capacity(config.max_capacity)
            .build();
        Self { inner, cache }
    }

    /// Access the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<S: SegmentSource + Sync> SegmentSource for CachedSegmentSource<S> {
    async fn fetch_segments(
        &self,
        train_type: TrainType,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Vec<Segment>, ProviderError> {
        let key = (train_type, from.to_string(), to.to_string(), date);

        if let Some(hit) = self.cache.get(&key).await {
            debug!(from, to, %date, "segment cache hit");
            return Ok((*hit).clone());
        }

        let segments = self.inner.fetch_segments(train_type, from, to, date).await?;
        self.cache.insert(key, Arc::new(segments.clone())).await;
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;
    use std::sync::Mutex;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
    }

    fn seg(train_no: &str) -> Segment {
        Segment {
            train_no: train_no.to_string(),
            train_type: TrainType::HighSpeed,
            from_station: "Beijing".to_string(),
            to_station: "Shanghai".to_string(),
            departure: ClockTime::parse("09:00").ok(),
            arrival: ClockTime::parse("13:00").ok(),
            run_time: "4h".to_string(),
            fares: vec![],
        }
    }

    /// Source that counts calls and can fail the first N of them.
    struct Counting {
        calls: Mutex<usize>,
        fail_first: Mutex<usize>,
    }

    impl Counting {
        fn new(fail_first: usize) -> Self {
            Self {
                calls: Mutex::new(0),
                fail_first: Mutex::new(fail_first),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl SegmentSource for Counting {
        async fn fetch_segments(
            &self,
            _train_type: TrainType,
            _from: &str,
            _to: &str,
            _date: NaiveDate,
        ) -> Result<Vec<Segment>, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            let mut fail = self.fail_first.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(ProviderError::Unavailable);
            }
            Ok(vec![seg("G1")])
        }
    }

    #[tokio::test]
    async fn repeated_request_hits_cache() {
        let source = CachedSegmentSource::new(Counting::new(0), &CacheConfig::default());

        let first = source
            .fetch_segments(TrainType::HighSpeed, "Beijing", "Shanghai", date())
            .await
            .unwrap();
        let second = source
            .fetch_segments(TrainType::HighSpeed, "Beijing", "Shanghai", date())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner().calls(), 1);
    }

    #[tokio::test]
    async fn key_includes_type_and_date() {
        let source = CachedSegmentSource::new(Counting::new(0), &CacheConfig::default());

        source
            .fetch_segments(TrainType::HighSpeed, "Beijing", "Shanghai", date())
            .await
            .unwrap();
        source
            .fetch_segments(TrainType::InterCity, "Beijing", "Shanghai", date())
            .await
            .unwrap();
        source
            .fetch_segments(
                TrainType::HighSpeed,
                "Beijing",
                "Shanghai",
                date().succ_opt().unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(source.inner().calls(), 3);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = CachedSegmentSource::new(Counting::new(1), &CacheConfig::default());

        let err = source
            .fetch_segments(TrainType::HighSpeed, "Beijing", "Shanghai", date())
            .await;
        assert!(err.is_err());

        // the retry reaches the source and its success is cached
        source
            .fetch_segments(TrainType::HighSpeed, "Beijing", "Shanghai", date())
            .await
            .unwrap();
        source
            .fetch_segments(TrainType::HighSpeed, "Beijing", "Shanghai", date())
            .await
            .unwrap();
        assert_eq!(source.inner().calls(), 2);
    }

    #[test]
    fn config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_secs, 120);
        assert_eq!(config.max_capacity, 1000);
    }
}
