//! Shared utilities used across TrackGate crates.
//!
//! - [`time`]: clock abstraction (real and mock time) for deterministic tests
//! - [`resilience`]: rate limiting for bounding mutation throughput
//!
//! This crate has no domain knowledge; everything Salesforce-specific lives
//! in `trackgate-domain` and above.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod time;

pub use time::{Clock, MockClock, SystemClock};
