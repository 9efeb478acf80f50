//! Shared data types for the event store

mod events;
mod filters;

pub use events::{EventPage, EventRow, NewEvent, TraceEventRow};
pub use filters::FilterRow;
