//! Utility functions for the application

pub mod crypto;
pub mod json;
pub mod otlp;
pub mod time;
