pub mod analyze;
pub mod config;
pub mod insights;
pub mod sample;
