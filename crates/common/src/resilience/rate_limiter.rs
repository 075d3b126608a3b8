//! Sliding-window rate limiting
//!
//! Maintains timestamps of recent acquisitions; on each attempt, entries
//! older than the window are dropped lazily and the attempt succeeds only
//! while fewer than the ceiling remain. Unlike a fixed bucket, the window
//! rolls: a burst at second 0 plus one more at second 61 is allowed, but the
//! ceiling can never be exceeded within any single window span.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::time::{Clock, SystemClock};

/// Configuration for the sliding-window rate limiter
#[derive(Debug, Clone)]
pub struct SlidingWindowConfig {
    /// Maximum number of acquisitions within any rolling window
    pub max_operations: usize,
    /// Length of the rolling window
    pub window: Duration,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self { max_operations: 5, window: Duration::from_secs(60) }
    }
}

impl SlidingWindowConfig {
    /// Create a new configuration
    pub fn new(max_operations: usize, window: Duration) -> Self {
        Self { max_operations, window }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_operations == 0 {
            return Err("max_operations must be greater than 0".to_string());
        }
        if self.window.is_zero() {
            return Err("window must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Sliding-window rate limiter
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use trackgate_common::resilience::{SlidingWindow, SlidingWindowConfig};
///
/// # fn example() -> Result<(), String> {
/// let limiter = SlidingWindow::new(SlidingWindowConfig::new(5, Duration::from_secs(60)))?;
///
/// if limiter.try_acquire() {
///     println!("Operation allowed");
/// } else {
///     println!("Rate limit exceeded, retry after {:?}", limiter.retry_after());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SlidingWindow<C: Clock = SystemClock> {
    config: SlidingWindowConfig,
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    clock: Arc<C>,
}

impl SlidingWindow<SystemClock> {
    /// Create a new limiter with the system clock
    pub fn new(config: SlidingWindowConfig) -> Result<Self, String> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> SlidingWindow<C> {
    /// Create a new limiter with a custom clock
    pub fn with_clock(config: SlidingWindowConfig, clock: C) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            timestamps: Arc::new(Mutex::new(VecDeque::with_capacity(config.max_operations))),
            clock: Arc::new(clock),
            config,
        })
    }

    fn lock_timestamps(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        match self.timestamps.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Sliding window timestamp lock poisoned");
                poisoned.into_inner()
            }
        }
    }

    /// Drop timestamps that have aged out of the window
    fn evict(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Try to record one acquisition
    ///
    /// Returns `true` (recording a new timestamp) if fewer than the ceiling
    /// of acquisitions remain within the window, `false` otherwise.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut timestamps = self.lock_timestamps();
        Self::evict(&mut timestamps, now, self.config.window);

        if timestamps.len() >= self.config.max_operations {
            debug!(
                in_window = timestamps.len(),
                ceiling = self.config.max_operations,
                "Rate limit: window full"
            );
            return false;
        }

        timestamps.push_back(now);
        debug!(in_window = timestamps.len(), ceiling = self.config.max_operations, "Acquired");
        true
    }

    /// Number of acquisitions currently counted in the window
    pub fn in_window(&self) -> usize {
        let now = self.clock.now();
        let mut timestamps = self.lock_timestamps();
        Self::evict(&mut timestamps, now, self.config.window);
        timestamps.len()
    }

    /// Time until the oldest counted acquisition exits the window
    ///
    /// Returns `None` while the window still has capacity (a new acquisition
    /// would succeed immediately).
    pub fn retry_after(&self) -> Option<Duration> {
        let now = self.clock.now();
        let mut timestamps = self.lock_timestamps();
        Self::evict(&mut timestamps, now, self.config.window);

        if timestamps.len() < self.config.max_operations {
            return None;
        }
        timestamps.front().map(|oldest| {
            self.config.window.saturating_sub(now.duration_since(*oldest))
        })
    }

    /// Clear all recorded acquisitions
    pub fn reset(&self) {
        self.lock_timestamps().clear();
    }
}

impl<C: Clock> Clone for SlidingWindow<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            timestamps: Arc::clone(&self.timestamps),
            clock: Arc::clone(&self.clock),
        }
    }
}
