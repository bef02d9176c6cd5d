//! Time-bounded in-memory cache of fetched series.
//!
//! The cache is an explicit object owned by the front-end (CLI run or TUI
//! session) and passed by `&mut` to every render. It memoizes successful
//! fetches per `SeriesId` for `ttl`; failures are never stored, so the next
//! request for a failed series goes back to the network.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::data::SeriesSource;
use crate::domain::{SeriesId, SeriesTable};
use crate::error::FetchError;

/// Source of "now" for expiry decisions.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct CacheEntry {
    table: Arc<SeriesTable>,
    fetched_at: Instant,
}

pub struct SeriesCache<S, C = SystemClock> {
    source: S,
    clock: C,
    ttl: Duration,
    entries: HashMap<SeriesId, CacheEntry>,
}

impl<S: SeriesSource> SeriesCache<S, SystemClock> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, SystemClock, ttl)
    }
}

impl<S: SeriesSource, C: Clock> SeriesCache<S, C> {
    pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Return the cached table for `series`, fetching it if absent or expired.
    pub fn get_or_fetch(&mut self, series: SeriesId) -> Result<Arc<SeriesTable>, FetchError> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(&series) {
            if now.saturating_duration_since(entry.fetched_at) < self.ttl {
                debug!("cache hit for series {series}");
                return Ok(Arc::clone(&entry.table));
            }
            debug!("cache entry for series {series} expired");
        }

        let table = match self.source.fetch(series) {
            Ok(table) => Arc::new(table),
            Err(err) => {
                self.entries.remove(&series);
                return Err(err);
            }
        };

        self.entries.insert(
            series,
            CacheEntry {
                table: Arc::clone(&table),
                fetched_at: now,
            },
        );
        Ok(table)
    }

    /// Cached table if present and still valid; never touches the network.
    pub fn peek(&self, series: SeriesId) -> Option<Arc<SeriesTable>> {
        let now = self.clock.now();
        self.entries
            .get(&series)
            .filter(|e| now.saturating_duration_since(e.fetched_at) < self.ttl)
            .map(|e| Arc::clone(&e.table))
    }

    /// Drop one entry so the next request refetches it.
    pub fn invalidate(&mut self, series: SeriesId) {
        self.entries.remove(&series);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
