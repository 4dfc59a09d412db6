//! Auxiliary HTTP handlers

pub mod status;

pub use status::{health_handler, health_router, HealthResponse, HealthState};
