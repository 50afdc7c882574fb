use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::debug;

use crate::metrics::TRACKED_CLIENTS;

// Rate limit window - timestamps of admitted requests for one client, oldest first
#[derive(Default, Debug)]
pub struct ClientWindow {
    pub timestamps: VecDeque<Instant>,
}

impl ClientWindow {
    // Drop every timestamp strictly older than `now - window`.
    // Timestamps are appended in order so this is always a prefix.
    fn purge(&mut self, now: Instant, window: Duration) {
        while self
            .timestamps
            .front()
            .is_some_and(|oldest| *oldest + window < now)
        {
            self.timestamps.pop_front();
        }
    }

    fn reset_in(&self, now: Instant, window: Duration) -> u64 {
        match self.timestamps.front() {
            Some(oldest) => (*oldest + window).saturating_duration_since(now).as_secs(),
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub admitted: bool,
    /// Requests inside the window, including this one when admitted.
    pub current_count: u32,
    pub reset_in_seconds: u64,
}

/// Admission control consulted by the chat gate.
///
/// `RateLimiter` keeps everything in process memory. Anything else that can
/// answer these calls (a shared store for multi-process deployments, say)
/// can be dropped into `AppState` without touching the handlers.
pub trait RequestLimiter: Send + Sync {
    fn check_and_record(&self, client_id: &str, now: Instant) -> RateLimitDecision;
    fn reset_in_seconds(&self, client_id: &str, now: Instant) -> u64;
    fn sweep(&self, now: Instant) -> usize;
    fn tracked_clients(&self) -> usize;
    fn limit(&self) -> u32;
    fn window(&self) -> Duration;
}

/// Per-client sliding window limiter.
///
/// At most `max_requests` admissions per client inside any trailing `window`.
/// Rejected requests are not recorded, so hammering the endpoint while over
/// the limit does not push the reset time out.
///
/// Each client's read-modify-write happens under the DashMap entry guard,
/// which holds the shard's write lock, so concurrent checks for the same
/// client are serialized and can never admit more than `max_requests`.
pub struct RateLimiter {
    windows: DashMap<String, ClientWindow>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    // Number of timestamps currently stored for a client (no purge)
    pub fn stored_count(&self, client_id: &str) -> usize {
        self.windows.get(client_id).map(|w| w.len()).unwrap_or(0)
    }
}

impl RequestLimiter for RateLimiter {
    fn check_and_record(&self, client_id: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self.windows.entry(client_id.to_string()).or_default();
        let window = entry.value_mut();

        window.purge(now, self.window);

        let count = window.len() as u32;
        if count >= self.max_requests {
            return RateLimitDecision {
                admitted: false,
                current_count: count,
                reset_in_seconds: window.reset_in(now, self.window),
            };
        }

        window.timestamps.push_back(now);
        RateLimitDecision {
            admitted: true,
            current_count: count + 1,
            reset_in_seconds: window.reset_in(now, self.window),
        }
    }

    fn reset_in_seconds(&self, client_id: &str, now: Instant) -> u64 {
        self.windows
            .get(client_id)
            .map(|w| w.reset_in(now, self.window))
            .unwrap_or(0)
    }

    // Evict clients whose windows are empty once expired timestamps are gone.
    fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| {
            w.purge(now, self.window);
            !w.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn limit(&self) -> u32 {
        self.max_requests
    }

    fn window(&self) -> Duration {
        self.window
    }
}

// Sweeper - evicts idle clients on a fixed interval so the map doesn't grow forever
pub async fn sweeper(limiter: Arc<dyn RequestLimiter>, every: Duration) {
    let mut interval = interval(every);

    debug!(interval = ?every, "rate limit sweeper started");

    loop {
        interval.tick().await;

        // tokio's clock, so a paused runtime drives expiry too
        let removed = limiter.sweep(tokio::time::Instant::now().into_std());
        let remaining = limiter.tracked_clients();
        TRACKED_CLIENTS.set(remaining as f64);

        if removed > 0 {
            debug!(removed, remaining, "evicted idle rate limit windows");
        }
    }
}
