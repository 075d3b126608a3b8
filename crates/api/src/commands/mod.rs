//! Gateway commands - the five operations exposed to the tool host
//!
//! Each command takes the context plus a serde-typed argument struct and
//! returns a structured result or a typed `GatewayError`. Results carry
//! both the typed fields and a rendered `summary` string the
//! conversational layer can relay without inspecting internals.

mod hours;
mod implementations;

pub use hours::*;
pub use implementations::*;
