//! Time-boxed snapshot cache
//!
//! `SnapshotCache` holds one immutable snapshot of data fetched from a
//! record source and decides when a read must refresh it:
//!
//! - no snapshot yet, a forced refresh, or a snapshot older than the TTL
//!   triggers a fetch
//! - a successful fetch replaces the snapshot wholesale
//! - a failed fetch serves the previous snapshot if there is one and leaves
//!   its timestamp alone, so the next read retries; with no previous
//!   snapshot the error is returned
//!
//! Reads of a fresh snapshot never block. Refreshes are serialized: callers
//! that queue behind an in-flight refresh reuse its result instead of
//! fetching again.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::SourceError;

/// An immutable snapshot plus the time it was fetched
#[derive(Debug)]
pub struct Snapshot<T> {
    data: T,
    refreshed_at: Instant,
    refreshed_at_utc: DateTime<Utc>,
    generation: u64,
}

impl<T> Snapshot<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Time since the fetch that produced this snapshot
    pub fn age(&self) -> Duration {
        self.refreshed_at.elapsed()
    }

    /// Wall-clock time of the fetch
    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at_utc
    }

    /// Count of successful refreshes, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Point-in-time view of a cache, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub has_snapshot: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    pub age: Option<Duration>,
    /// Snapshot exists but is older than the TTL
    pub is_stale: bool,
    pub generation: u64,
}

/// Snapshot cache with TTL expiry and stale fallback
pub struct SnapshotCache<T> {
    name: &'static str,
    ttl: Duration,
    fetch_timeout: Option<Duration>,
    current: ArcSwapOption<Snapshot<T>>,
    refresh_lock: Mutex<()>,
}

impl<T> SnapshotCache<T> {
    /// Create an empty cache; `name` only labels log lines
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            fetch_timeout: None,
            current: ArcSwapOption::empty(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Bound every fetch; an elapsed fetch counts as a source failure
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot without triggering a refresh
    pub fn current(&self) -> Option<Arc<Snapshot<T>>> {
        self.current.load_full()
    }

    fn is_expired(&self, snapshot: &Snapshot<T>) -> bool {
        snapshot.age() > self.ttl
    }

    pub fn status(&self) -> CacheStatus {
        match self.current() {
            Some(snapshot) => CacheStatus {
                has_snapshot: true,
                last_refresh: Some(snapshot.refreshed_at()),
                age: Some(snapshot.age()),
                is_stale: self.is_expired(&snapshot),
                generation: snapshot.generation(),
            },
            None => CacheStatus {
                has_snapshot: false,
                last_refresh: None,
                age: None,
                is_stale: false,
                generation: 0,
            },
        }
    }

    /// Return the snapshot, refreshing it through `fetch` when required
    pub async fn get_or_refresh<F, Fut>(
        &self,
        force: bool,
        fetch: F,
    ) -> Result<Arc<Snapshot<T>>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let observed = self.current.load_full();
        if !force {
            if let Some(snapshot) = &observed {
                if !self.is_expired(snapshot) {
                    return Ok(snapshot.clone());
                }
            }
        }

        let _guard = self.refresh_lock.lock().await;

        let latest = self.current.load_full();
        if let Some(snapshot) = &latest {
            let refreshed_meanwhile =
                observed.as_ref().map(|s| s.generation) != Some(snapshot.generation);
            if refreshed_meanwhile || (!force && !self.is_expired(snapshot)) {
                return Ok(snapshot.clone());
            }
        }

        tracing::info!(cache = self.name, force, "Refreshing snapshot");

        let result = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch()).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout(limit)),
            },
            None => fetch().await,
        };

        match result {
            Ok(data) => {
                let generation = latest.as_ref().map_or(1, |s| s.generation + 1);
                let snapshot = Arc::new(Snapshot {
                    data,
                    refreshed_at: Instant::now(),
                    refreshed_at_utc: Utc::now(),
                    generation,
                });
                self.current.store(Some(snapshot.clone()));
                tracing::info!(cache = self.name, generation, "Snapshot refreshed");
                Ok(snapshot)
            }
            Err(err) => match latest {
                Some(stale) => {
                    tracing::warn!(
                        cache = self.name,
                        error = %err,
                        age_secs = stale.age().as_secs(),
                        "Refresh failed, serving stale snapshot"
                    );
                    Ok(stale)
                }
                None => {
                    tracing::error!(cache = self.name, error = %err, "Initial refresh failed");
                    Err(err)
                }
            },
        }
    }
}
