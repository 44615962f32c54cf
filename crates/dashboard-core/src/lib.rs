//! Shared types for the order dashboard.
//!
//! Holds the order-line record model, the inclusive date range used to
//! select records, timestamp parsing, number formatting, CLI settings and
//! the workspace-wide error type.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod timestamps;

pub use error::{DashboardError, Result};
pub use models::{DateRange, OrderLine, YearMonth};
