//! Foundational types: profiles, contracts, jobs, errors and configuration.

pub mod config;
pub mod contract;
pub mod error;
pub mod job;
pub mod profile;
