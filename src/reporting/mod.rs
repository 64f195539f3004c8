//! Earnings reports over paid jobs.

pub mod aggregator;
pub mod grouping;
pub mod window;

pub use aggregator::{ClientSpend, ProfessionEarnings, ReportingAggregator};
pub use grouping::GroupTotals;
pub use window::DateWindow;
