//! Retry pacing, and tracking of consecutive storage-connection failures.
//!
//! A database outage is survived request by request: each failure is
//! answered and logged, the worker backs off exponentially before taking
//! the next request, and only after `limit` consecutive connection failures
//! does it give up so its supervisor can restart it.

use std::time::Duration;

/// How long the worker pauses between attempts while a dependency (the
/// database, or the broker at startup) keeps failing.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    /// Pause after the first failure.
    pub initial_delay: Duration,
    /// Longest pause ever taken.
    pub max_delay: Duration,
    /// Growth factor applied to the pause after every further failure.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl BackoffConfig {
    /// Pause to take after one that lasted `current`, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .map_or(self.max_delay, |next| next.min(self.max_delay))
    }
}

/// What the worker should do after a request, storage-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    /// Carry on immediately.
    Healthy,
    /// Storage is failing; wait `delay` before the next request.
    Degraded { failures: u32, delay: Duration },
    /// Too many consecutive failures; stop the worker.
    Exhausted { failures: u32 },
}

pub struct StorageHealth {
    limit: u32,
    backoff: BackoffConfig,
    consecutive_failures: u32,
    delay: Duration,
}

impl StorageHealth {
    /// `limit` is clamped to at least one failure.
    pub fn new(limit: u32, backoff: BackoffConfig) -> Self {
        Self {
            limit: limit.max(1),
            backoff,
            consecutive_failures: 0,
            delay: backoff.initial_delay,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The database was reached (the write may still have failed).
    pub fn record_reachable(&mut self) -> StorageStatus {
        if self.consecutive_failures > 0 {
            tracing::info!(
                failures = self.consecutive_failures,
                "Storage reachable again",
            );
        }
        self.consecutive_failures = 0;
        self.delay = self.backoff.initial_delay;
        StorageStatus::Healthy
    }

    /// No connection to the database could be obtained.
    pub fn record_unavailable(&mut self) -> StorageStatus {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.limit {
            return StorageStatus::Exhausted {
                failures: self.consecutive_failures,
            };
        }

        let delay = self.delay;
        self.delay = self.backoff.next_delay(self.delay);
        StorageStatus::Degraded {
            failures: self.consecutive_failures,
            delay,
        }
    }
}
