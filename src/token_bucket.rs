// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Byte-rate limiting for the engine's upload and download paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Oversized requests are approximated by one bounded sleep.
const MAX_OVERSIZED_WAIT: Duration = Duration::from_secs(300);

/// Refill state, protected by the mutex.
#[derive(Debug)]
struct Bucket {
    last_refill: Instant,
    tokens: f64,
    rate: f64,
    burst: f64,
}

/// Thread-safe token bucket with a lock-free fast path for the unlimited
/// case. Tokens are bytes; a rate of zero disables limiting entirely.
#[derive(Debug)]
pub struct TokenBucket {
    // Fast-path flag, checked without taking the lock.
    unlimited: AtomicBool,
    inner: Mutex<Bucket>,
}

impl TokenBucket {
    /// `rate` is the refill rate in bytes per second, `burst` the bucket
    /// capacity in bytes. The bucket starts full.
    pub fn new(rate: u64, burst: u64) -> Self {
        let unlimited = rate == 0;
        let burst = if unlimited {
            f64::INFINITY
        } else {
            burst as f64
        };

        TokenBucket {
            unlimited: AtomicBool::new(unlimited),
            inner: Mutex::new(Bucket {
                last_refill: Instant::now(),
                tokens: burst,
                rate: rate as f64,
                burst,
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0, 0)
    }

    pub fn is_unlimited(&self) -> bool {
        self.unlimited.load(Ordering::Relaxed)
    }

    /// Refill rate in bytes per second; zero when unlimited.
    pub fn rate(&self) -> u64 {
        self.inner.lock().unwrap().rate as u64
    }

    /// Bucket capacity in bytes.
    pub fn burst(&self) -> u64 {
        let burst = self.inner.lock().unwrap().burst;
        if burst.is_infinite() {
            u64::MAX
        } else {
            burst as u64
        }
    }

    /// Takes `amount` bytes out of the bucket, sleeping until the refill
    /// covers the deficit. Returns immediately when unlimited.
    pub async fn consume(&self, amount: u64) {
        if self.unlimited.load(Ordering::Relaxed) {
            return;
        }

        let amount = amount as f64;
        let (rate, burst) = {
            let guard = self.inner.lock().unwrap();
            (guard.rate, guard.burst)
        };

        // Amounts beyond the capacity can never fit; sleep for the full
        // refill time instead, bounded so a bogus request cannot stall the
        // caller for minutes.
        if amount > burst {
            let required = Duration::from_secs_f64(amount / rate);
            tokio::time::sleep(required.min(MAX_OVERSIZED_WAIT)).await;
            return;
        }

        loop {
            let wait = {
                let mut guard = self.inner.lock().unwrap();
                guard.refill();

                if guard.tokens >= amount {
                    guard.tokens -= amount;
                    break;
                }

                let deficit = amount - guard.tokens;
                Duration::from_secs_f64((deficit / rate).max(0.001))
            };

            tokio::time::sleep(wait).await;
        }
    }

    #[cfg(test)]
    fn set_tokens(&self, tokens: f64) {
        self.inner.lock().unwrap().tokens = tokens;
    }

    #[cfg(test)]
    fn tokens(&self) -> f64 {
        self.inner.lock().unwrap().tokens
    }
}

impl Bucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.last_refill = now;
        if self.rate > 0.0 {
            self.tokens = (self.tokens + elapsed.as_secs_f64() * self.rate).min(self.burst);
        }
    }
}
