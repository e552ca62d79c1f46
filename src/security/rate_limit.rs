//! Fixed-window rate limiting for form submissions.
//!
//! Counts requests per key in non-overlapping windows. A window starts on
//! the first request after the previous one expired and resets fully when
//! it ends, so bursts on both sides of a boundary can admit up to twice
//! the limit in a short span.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Counter state of one key after an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Whether this request was counted against the window.
    pub admitted: bool,
    pub count: u32,
    pub reset_at_ms: u64,
}

/// Backing store for window counters.
///
/// `try_acquire` must check and count atomically per key.
pub trait RateLimitStore: Send + Sync {
    /// Admit one request for `key` if fewer than `max_requests` were admitted
    /// in the active window, opening a new window of `window_ms` when none is
    /// active at `now_ms`. Rejected requests leave the entry untouched.
    fn try_acquire(
        &self,
        key: &str,
        max_requests: u32,
        window_ms: u64,
        now_ms: u64,
    ) -> WindowCount;

    /// Drop entries whose window ended before `now_ms`. Returns how many were removed.
    fn purge_expired(&self, now_ms: u64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at_ms: u64,
}

/// Process-local store. Entries are only replaced when their window lapses;
/// without a sweep, one entry per distinct key stays in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryStore {
    fn try_acquire(
        &self,
        key: &str,
        max_requests: u32,
        window_ms: u64,
        now_ms: u64,
    ) -> WindowCount {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                reset_at_ms: 0,
            });

        if now_ms >= entry.reset_at_ms {
            entry.count = 0;
            entry.reset_at_ms = now_ms.saturating_add(window_ms);
        }

        let admitted = entry.count < max_requests;
        if admitted {
            entry.count += 1;
        }

        WindowCount {
            admitted,
            count: entry.count,
            reset_at_ms: entry.reset_at_ms,
        }
    }

    fn purge_expired(&self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at_ms > now_ms);
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Limits applied to one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub enabled: bool,
    pub max_requests: u32,
    pub window: Duration,
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            window: config.window(),
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32, reset_at_ms: u64 },
    Limited { retry_after_ms: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Fixed-window limiter over a pluggable store and clock.
pub struct FixedWindowLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// In-memory store on the wall clock.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    pub fn check(&self, key: &str, policy: &RateLimitPolicy) -> RateDecision {
        let now = self.clock.now_ms();
        if !policy.enabled {
            return RateDecision::Allowed {
                remaining: policy.max_requests,
                reset_at_ms: now,
            };
        }

        let window_ms = policy.window.as_millis() as u64;
        let current = self
            .store
            .try_acquire(key, policy.max_requests, window_ms, now);

        if current.admitted {
            RateDecision::Allowed {
                remaining: policy.max_requests.saturating_sub(current.count),
                reset_at_ms: current.reset_at_ms,
            }
        } else {
            tracing::warn!(key = %key, count = current.count, "Rate limit exceeded");
            RateDecision::Limited {
                retry_after_ms: current.reset_at_ms.saturating_sub(now),
            }
        }
    }

    /// Remove expired windows from the store.
    pub fn purge_expired(&self) -> usize {
        let removed = self.store.purge_expired(self.clock.now_ms());
        metrics::record_limiter_entries(self.store.len());
        removed
    }

    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }
}

/// Periodically purge expired windows until the shutdown signal fires.
pub async fn run_sweeper(
    limiter: Arc<FixedWindowLimiter>,
    interval: Duration,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.purge_expired();
                tracing::debug!(removed, remaining = limiter.tracked_keys(), "Rate limit sweep");
            }
            _ = shutdown.recv() => break,
        }
    }
}
