/*
 *  poller/top_cache.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time bounded cache of the top tracks list
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::service::{MusicService, ServiceError, TimeRange, TrackSummary};

/// Single entry cache in front of [`MusicService::top_tracks`].
///
/// The list changes on a scale of days, so it is fetched at most once per
/// `ttl` unless the cached list is empty.
#[derive(Debug)]
pub struct TopTracksCache {
    items: Option<Arc<Vec<TrackSummary>>>,
    fetched_at: Option<Instant>,
    ttl: Duration,
    limit: u32,
    window: TimeRange,
}

impl TopTracksCache {
    pub fn new(ttl: Duration, limit: u32, window: TimeRange) -> Self {
        Self {
            items: None,
            fetched_at: None,
            ttl,
            limit,
            window,
        }
    }

    /// True when a cached, non-empty list younger than the TTL exists.
    pub fn is_fresh(&self, now: Instant) -> bool {
        match (&self.items, self.fetched_at) {
            (Some(items), Some(at)) => {
                !items.is_empty() && now.saturating_duration_since(at) <= self.ttl
            }
            _ => false,
        }
    }

    /// Cached list, refreshed from `service` when stale.
    ///
    /// A failed refresh leaves the previous entry in place.
    pub async fn get_or_refresh<S: MusicService>(
        &mut self,
        service: &mut S,
        now: Instant,
    ) -> Result<Arc<Vec<TrackSummary>>, ServiceError> {
        if self.is_fresh(now) {
            if let Some(items) = &self.items {
                return Ok(Arc::clone(items));
            }
        }

        let fetched = Arc::new(service.top_tracks(self.limit, self.window).await?);
        debug!("top tracks refreshed: {} entries", fetched.len());
        self.items = Some(Arc::clone(&fetched));
        self.fetched_at = Some(now);
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::TrackSnapshot;

    #[derive(Default)]
    struct CountingService {
        calls: usize,
        fail: bool,
        empty: bool,
    }

    impl MusicService for CountingService {
        async fn current_playback(&mut self) -> Result<Option<TrackSnapshot>, ServiceError> {
            Ok(None)
        }

        async fn top_tracks(
            &mut self,
            limit: u32,
            _window: TimeRange,
        ) -> Result<Vec<TrackSummary>, ServiceError> {
            self.calls += 1;
            if self.fail {
                return Err(ServiceError::Auth("nope".into()));
            }
            if self.empty {
                return Ok(Vec::new());
            }
            Ok((0..limit)
                .map(|i| TrackSummary {
                    id: format!("t{}", i),
                    title: format!("Song {}", i),
                    artists: "Band".into(),
                    art_url: None,
                })
                .collect())
        }
    }

    fn cache() -> TopTracksCache {
        TopTracksCache::new(Duration::from_secs(100), 7, TimeRange::ShortTerm)
    }

    #[tokio::test]
    async fn test_served_from_cache_within_ttl() {
        let mut svc = CountingService::default();
        let mut c = cache();
        let t0 = Instant::now();

        let a = c.get_or_refresh(&mut svc, t0).await.unwrap();
        let b = c.get_or_refresh(&mut svc, t0 + Duration::from_secs(100)).await.unwrap();
        assert_eq!(svc.calls, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 7);
    }

    #[tokio::test]
    async fn test_refreshed_after_ttl() {
        let mut svc = CountingService::default();
        let mut c = cache();
        let t0 = Instant::now();

        c.get_or_refresh(&mut svc, t0).await.unwrap();
        c.get_or_refresh(&mut svc, t0 + Duration::from_secs(101)).await.unwrap();
        assert_eq!(svc.calls, 2);
    }

    #[tokio::test]
    async fn test_empty_list_is_refetched() {
        let mut svc = CountingService { empty: true, ..Default::default() };
        let mut c = cache();
        let t0 = Instant::now();

        c.get_or_refresh(&mut svc, t0).await.unwrap();
        c.get_or_refresh(&mut svc, t0 + Duration::from_secs(1)).await.unwrap();
        assert_eq!(svc.calls, 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_old_entry() {
        let mut svc = CountingService::default();
        let mut c = cache();
        let t0 = Instant::now();
        c.get_or_refresh(&mut svc, t0).await.unwrap();

        svc.fail = true;
        let later = t0 + Duration::from_secs(500);
        assert!(c.get_or_refresh(&mut svc, later).await.is_err());
        assert!(c.items.as_ref().is_some_and(|i| i.len() == 7));
        assert!(!c.is_fresh(later));
    }
}
