pub mod cli;
pub mod config;
pub mod data;
pub mod optimizer;
pub mod parallel;
pub mod telemetry;
