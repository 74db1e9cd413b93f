pub mod config;
pub mod error;
pub mod ingest;
pub mod lending;
pub mod telemetry;
