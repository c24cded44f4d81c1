//! Talentwatch: tracks employees of target companies, detects departures,
//! classifies where they went, and raises tiered alerts.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracking;
