pub mod config;
pub mod error;
pub mod filings;
pub mod telemetry;
