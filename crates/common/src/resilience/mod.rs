//! Resilience patterns for bounding load on external systems
//!
//! Currently provides a single pattern:
//! - **Sliding-window rate limiting**: bounds how many operations may occur
//!   within any rolling time span, with a retry-after estimate on rejection.
//!
//! Implementations are clock-generic so tests can drive them with
//! [`MockClock`](crate::time::MockClock) instead of waiting on real time.

pub mod rate_limiter;

pub use rate_limiter::{SlidingWindow, SlidingWindowConfig};
