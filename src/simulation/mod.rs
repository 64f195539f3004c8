//! Synthetic marketplaces for exercising the engine.

pub mod generator;

pub use generator::{generate_marketplace, MarketplaceConfig};
