//! API route handlers

pub mod events;
pub mod filters;
pub mod health;
pub mod otlp_collector;
