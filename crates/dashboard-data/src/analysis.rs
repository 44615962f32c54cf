//! Main analysis pipeline.
//!
//! Filters a loaded [`OrderDataset`] to one date range, runs every
//! aggregation over the filtered slice and bundles the results into a
//! [`DashboardSummary`] ready for a presenter.

use chrono::{NaiveDate, Utc};
use dashboard_core::models::{DateRange, OrderLine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregator::{
    saturating_total, CategoryCitySummary, CategoryTotal, CategoryTotals, CitySummary, MonthlyItems,
    MonthlyRevenue, OrderAggregator,
};
use crate::dataset::OrderDataset;
use crate::rfm::{RfmCalculator, RfmRow, RfmSummary};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the summary tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// First day of the reporting window.
    pub start_date: NaiveDate,
    /// Last day of the reporting window.
    pub end_date: NaiveDate,
    /// Order lines inside the window.
    pub records_in_range: usize,
    /// Order lines in the whole dataset.
    pub records_total: usize,
    /// Distinct orders inside the window.
    pub orders_in_range: usize,
    /// Wall-clock seconds spent aggregating.
    pub aggregation_time_seconds: f64,
}

/// Every table and headline metric for one date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub metadata: DashboardMetadata,
    /// Items sold in the window (sum of the monthly volume table).
    pub total_items: u64,
    /// Revenue in the window (sum of the monthly revenue table).
    pub total_revenue: f64,
    pub category_summary: Vec<CategoryCitySummary>,
    pub city_summary: Vec<CitySummary>,
    pub category_totals: CategoryTotals,
    pub best_category: Option<CategoryTotal>,
    pub worst_category: Option<CategoryTotal>,
    pub monthly_order_volume: Vec<MonthlyItems>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub rfm: Vec<RfmRow>,
    pub rfm_summary: RfmSummary,
}

/// The six tables computed over one filtered slice, with no metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTables {
    pub category_summary: Vec<CategoryCitySummary>,
    pub city_summary: Vec<CitySummary>,
    pub category_totals: CategoryTotals,
    pub monthly_order_volume: Vec<MonthlyItems>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub rfm: Vec<RfmRow>,
}

impl SummaryTables {
    /// Run all six aggregations over `records`.
    ///
    /// The RFM anchor is the latest purchase date in `records`, so it moves
    /// with the date range.
    pub fn compute(records: &[OrderLine]) -> Self {
        Self {
            category_summary: OrderAggregator::category_summary(records),
            city_summary: OrderAggregator::city_summary(records),
            category_totals: OrderAggregator::category_totals(records),
            monthly_order_volume: OrderAggregator::monthly_order_volume(records),
            monthly_revenue: OrderAggregator::monthly_revenue(records),
            rfm: RfmCalculator::create(records),
        }
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline for `range`.
///
/// 1. Select the records purchased inside `range`.
/// 2. Compute the six summary tables.
/// 3. Derive headline totals, best/worst category and RFM means.
///
/// An empty window is not an error: every table comes back empty and the RFM
/// means are `None`.
pub fn build_dashboard(dataset: &OrderDataset, range: DateRange) -> DashboardSummary {
    let start = std::time::Instant::now();

    // ── Step 1: Filter ────────────────────────────────────────────────────────
    let records = dataset.filter(&range);
    debug!(
        "Range {} selects {} of {} order lines",
        range,
        records.len(),
        dataset.len()
    );

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let tables = SummaryTables::compute(records);

    // ── Step 3: Headline figures ──────────────────────────────────────────────
    let total_items = saturating_total(
        tables
            .monthly_order_volume
            .iter()
            .map(|m| m.order_item_id),
    );
    let total_revenue: f64 = tables.monthly_revenue.iter().map(|m| m.price).sum();
    let best_category = tables.category_totals.best().cloned();
    let worst_category = tables.category_totals.worst().cloned();
    let rfm_summary = RfmSummary::from_rows(&tables.rfm).rounded();

    let metadata = DashboardMetadata {
        generated_at: Utc::now().to_rfc3339(),
        start_date: range.start(),
        end_date: range.end(),
        records_in_range: records.len(),
        records_total: dataset.len(),
        orders_in_range: OrderAggregator::distinct_orders(records),
        aggregation_time_seconds: start.elapsed().as_secs_f64(),
    };

    info!(
        "Dashboard built: {} orders, {} items, {} customers",
        metadata.orders_in_range, total_items, rfm_summary.customers
    );

    DashboardSummary {
        metadata,
        total_items,
        total_revenue,
        category_summary: tables.category_summary,
        city_summary: tables.city_summary,
        category_totals: tables.category_totals,
        best_category,
        worst_category,
        monthly_order_volume: tables.monthly_order_volume,
        monthly_revenue: tables.monthly_revenue,
        rfm: tables.rfm,
        rfm_summary,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
