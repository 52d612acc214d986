// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Minimum-interval rate limiter for outbound calls.
//!
//! Every guarded call waits until at least `min_interval` has passed since
//! the previous guarded call through the same limiter completed. Arrivals
//! serialize on the lock while they wait, then release it for the call
//! itself and re-acquire it to stamp the completion time.
//!
//! This is cooperative client-side throttling, not a concurrency gate: it
//! spaces call starts but does not stop a slow call from overlapping the
//! next one.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Thread-safe minimum-interval limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum gap between guarded calls
    min_interval: Duration,
    /// Time of the most recent guarded call start or completion
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter enforcing the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Create a limiter allowing `rpm` calls per minute.
    pub fn per_minute(rpm: u32) -> Self {
        if rpm == 0 {
            Self::new(Duration::ZERO)
        } else {
            Self::new(Duration::from_secs(60) / rpm)
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Run `call` once the minimum interval has elapsed.
    ///
    /// The completion time is stamped whether the call succeeds or fails.
    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        {
            let mut last = self.last_call.lock().await;
            if let Some(previous) = *last {
                let elapsed = previous.elapsed();
                if elapsed < self.min_interval {
                    let wait = self.min_interval - elapsed;
                    debug!(?wait, "Rate limiter waiting");
                    // Holding the lock keeps later arrivals queued behind this wait.
                    sleep(wait).await;
                }
            }
            *last = Some(Instant::now());
        }

        let result = call().await;

        *self.last_call.lock().await = Some(Instant::now());
        result
    }
}
