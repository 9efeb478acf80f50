//! Domain logic
//!
//! - `events` - OTLP spans and log records mapped onto stored events

pub mod events;

pub use events::{events_from_logs, events_from_traces};
