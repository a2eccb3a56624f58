pub mod admission;
pub mod config;
pub mod error;
pub mod labels;
pub mod review;
pub mod telemetry;
pub mod workload;
