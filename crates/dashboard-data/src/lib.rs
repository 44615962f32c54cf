//! Data layer for the order dashboard.
//!
//! Loads the order-line CSV into an [`dataset::OrderDataset`], filters it by
//! date range, and computes the category, city, monthly and RFM summaries.

pub mod aggregator;
pub mod analysis;
pub mod dataset;
pub mod reader;
pub mod rfm;

pub use dashboard_core as core;
