//! Tutor to job posting matching and scheduling conflict detection.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
