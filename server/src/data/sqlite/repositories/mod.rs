//! SQLite repositories
//!
//! Row types (EventRow, FilterRow, etc.) live in `crate::data::types`.

pub mod event;
pub mod filter;

pub use event::{
    get_event_attributes, insert_events, list_events, list_trace_events, unique_attribute_names,
};
pub use filter::{delete_filter, list_filter_texts, list_filters, record_filter};
