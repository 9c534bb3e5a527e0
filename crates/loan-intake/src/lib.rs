//! Core library for the education-loan intake portal: configuration,
//! telemetry, and the intake/lender workflow engines consumed by the API
//! service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
