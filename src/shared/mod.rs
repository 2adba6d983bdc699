//! Shared types, errors, math and configuration

pub mod config;
pub mod errors;
pub mod math;
pub mod types;
