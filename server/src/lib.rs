//! Manta: OTLP trace and log collector with a filterable event search API

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
