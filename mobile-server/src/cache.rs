//! Caching layer for trip planner responses.
//!
//! Endpoints are rounded to a ~1 m grid and the requested time to a bucket,
//! so repeated plans between the same places share an entry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Timelike};
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{Itinerary, ModeSet};
use crate::planner::{PlanRequest, PlannerError, TripPlanner};

/// Cache key for planned trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    from: (i64, i64),
    to: (i64, i64),
    modes: ModeSet,
    arrive_by: bool,
    date: NaiveDate,
    /// Minutes from midnight divided by the bucket size
    bucket: u16,
    num_itineraries: u8,
    show_intermediate_stops: bool,
}

/// Cached plan entry.
type PlanEntry = Arc<Vec<Itinerary>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
            bucket_mins: 5,
        }
    }
}

/// Cache for planner responses.
pub struct PlanCache {
    plans: MokaCache<PlanKey, PlanEntry>,

    /// Time bucket size in minutes.
    bucket_mins: u16,
}

impl PlanCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            plans,
            bucket_mins: config.bucket_mins.max(1),
        }
    }

    /// Compute the time bucket for a clock time.
    fn time_bucket(&self, time: NaiveTime) -> u16 {
        let mins = (time.hour() * 60 + time.minute()) as u16;
        mins / self.bucket_mins
    }

    fn key(&self, request: &PlanRequest) -> PlanKey {
        PlanKey {
            from: request.from.grid_key(),
            to: request.to.grid_key(),
            modes: request.modes,
            arrive_by: request.arrive_by,
            date: request.when.date(),
            bucket: self.time_bucket(request.when.time()),
            num_itineraries: request.num_itineraries,
            show_intermediate_stops: request.show_intermediate_stops,
        }
    }
}

/// Trip planner with caching.
///
/// Wraps any `TripPlanner` and caches successful plans. Errors are not cached.
pub struct CachedPlanner<P> {
    inner: P,
    cache: PlanCache,
}

impl<P: TripPlanner> CachedPlanner<P> {
    /// Create a new cached planner.
    pub fn new(inner: P, cache_config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: PlanCache::new(cache_config),
        }
    }

    /// Access the underlying planner for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: TripPlanner> TripPlanner for CachedPlanner<P> {
    async fn plan(&self, request: &PlanRequest) -> Result<Arc<Vec<Itinerary>>, PlannerError> {
        let key = self.cache.key(request);

        if let Some(cached) = self.cache.plans.get(&key).await {
            debug!(modes = request.modes.as_param(), "plan cache hit");
            return Ok(cached);
        }

        let itineraries = self.inner.plan(request).await?;
        self.cache.plans.insert(key, itineraries.clone()).await;

        Ok(itineraries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use chrono::{DateTime, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPlanner {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPlanner {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl TripPlanner for CountingPlanner {
        async fn plan(&self, _request: &PlanRequest) -> Result<Arc<Vec<Itinerary>>, PlannerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PlannerError::NoItinerary);
            }
            let t = DateTime::from_timestamp(0, 0).unwrap();
            Ok(Arc::new(vec![Itinerary {
                legs: vec![],
                duration_secs: 600.0,
                walk_distance_m: 0.0,
                start_time: t,
                end_time: t,
            }]))
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn request(when: NaiveDateTime) -> PlanRequest {
        PlanRequest::new(
            Coordinate::new(5.7146, 45.1912),
            Coordinate::new(5.7245, 45.1885),
            when,
        )
    }

    #[test]
    fn time_bucket_calculation() {
        let cache = PlanCache::new(&CacheConfig::default());

        // 10:00 = 600 mins, bucket size 5 → bucket 120
        assert_eq!(cache.time_bucket(at(10, 0).time()), 120);

        // 10:04 = 604 mins → bucket 120
        assert_eq!(cache.time_bucket(at(10, 4).time()), 120);

        // 10:05 = 605 mins → bucket 121
        assert_eq!(cache.time_bucket(at(10, 5).time()), 121);

        // 23:59 = 1439 mins → bucket 287
        assert_eq!(cache.time_bucket(at(23, 59).time()), 287);
    }

    #[test]
    fn key_distinguishes_modes_and_direction() {
        let cache = PlanCache::new(&CacheConfig::default());
        let base = request(at(10, 0));

        assert_eq!(cache.key(&base), cache.key(&request(at(10, 3))));
        assert_ne!(cache.key(&base), cache.key(&base.clone().with_modes(ModeSet::Walk)));
        assert_ne!(cache.key(&base), cache.key(&base.clone().arriving_by(true)));
        assert_ne!(cache.key(&base), cache.key(&request(at(10, 5))));
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
        assert_eq!(config.bucket_mins, 5);
    }

    #[tokio::test]
    async fn repeated_plan_hits_cache() {
        let planner = CachedPlanner::new(CountingPlanner::new(false), &CacheConfig::default());

        let first = planner.plan(&request(at(10, 0))).await.unwrap();
        let second = planner.plan(&request(at(10, 2))).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(planner.inner().calls.load(Ordering::SeqCst), 1);

        planner.plan(&request(at(10, 7))).await.unwrap();
        assert_eq!(planner.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let planner = CachedPlanner::new(CountingPlanner::new(true), &CacheConfig::default());

        assert!(planner.plan(&request(at(10, 0))).await.is_err());
        assert!(planner.plan(&request(at(10, 0))).await.is_err());
        assert_eq!(planner.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn travel_time_uses_first_itinerary() {
        let planner = CachedPlanner::new(CountingPlanner::new(false), &CacheConfig::default());
        let secs = planner
            .travel_time(
                Coordinate::new(5.7, 45.1),
                Coordinate::new(5.8, 45.2),
                ModeSet::Bicycle,
                at(9, 0),
            )
            .await
            .unwrap();
        assert_eq!(secs, 600.0);
    }
}
