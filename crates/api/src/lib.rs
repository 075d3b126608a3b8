//! # TrackGate API
//!
//! The tool surface the conversational host depends on: five named
//! operations with fixed, serde-typed argument schemas and structured
//! success/error results.
//!
//! This crate contains:
//! - [`context`]: the dependency-injection container, constructed once per
//!   process (fatal configuration errors surface here, not per call)
//! - [`commands`]: the five operations (create, update, log-hours, query,
//!   get)
//! - [`telemetry`]: tracing setup for the embedding host
//!
//! The tool-invocation transport itself (how an utterance becomes a typed
//! call) is the host's concern; nothing here parses natural language.

pub mod commands;
pub mod context;
pub mod telemetry;

pub use commands::*;
pub use context::GatewayContext;
