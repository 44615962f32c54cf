//! Recency / Frequency / Monetary customer segmentation.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use dashboard_core::formatting::round_to;
use dashboard_core::models::OrderLine;
use serde::{Deserialize, Serialize};

/// RFM measures for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmRow {
    pub customer_id: String,
    /// Distinct orders placed.
    pub frequency: usize,
    /// Total spend across all line items.
    pub monetary: f64,
    /// Days between the customer's last purchase date and the anchor date.
    pub recency: i64,
}

/// Column means over a set of [`RfmRow`]s; every mean is `None` when there
/// are no customers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfmSummary {
    pub customers: usize,
    pub avg_recency: Option<f64>,
    pub avg_frequency: Option<f64>,
    pub avg_monetary: Option<f64>,
}

impl RfmSummary {
    pub fn from_rows(rows: &[RfmRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let n = rows.len() as f64;
        let recency: i64 = rows.iter().map(|r| r.recency).sum();
        let frequency: usize = rows.iter().map(|r| r.frequency).sum();
        let monetary: f64 = rows.iter().map(|r| r.monetary).sum();
        Self {
            customers: rows.len(),
            avg_recency: Some(recency as f64 / n),
            avg_frequency: Some(frequency as f64 / n),
            avg_monetary: Some(monetary / n),
        }
    }

    /// Display precision: recency to one decimal, frequency to two.
    pub fn rounded(self) -> Self {
        Self {
            avg_recency: self.avg_recency.map(|v| round_to(v, 1)),
            avg_frequency: self.avg_frequency.map(|v| round_to(v, 2)),
            ..self
        }
    }
}

struct CustomerAccumulator<'a> {
    order_ids: HashSet<&'a str>,
    monetary: f64,
    last_purchase: NaiveDate,
}

// ── RfmCalculator ─────────────────────────────────────────────────────────────

/// Stateless collection of RFM calculations.
pub struct RfmCalculator;

impl RfmCalculator {
    /// Latest purchase date in `records`, the reference point for recency.
    pub fn recency_anchor(records: &[OrderLine]) -> Option<NaiveDate> {
        records.iter().map(OrderLine::purchase_date).max()
    }

    /// One row per customer, ordered by `customer_id`.
    ///
    /// Recency is measured from `anchor` to the date portion of the
    /// customer's latest purchase, so a customer who bought on the anchor
    /// day has recency 0 whatever the time of day.
    pub fn compute(records: &[OrderLine], anchor: NaiveDate) -> Vec<RfmRow> {
        let mut customers: BTreeMap<&str, CustomerAccumulator<'_>> = BTreeMap::new();

        for record in records {
            let date = record.purchase_date();
            let acc = customers
                .entry(record.customer_id.as_str())
                .or_insert_with(|| CustomerAccumulator {
                    order_ids: HashSet::new(),
                    monetary: 0.0,
                    last_purchase: date,
                });
            acc.order_ids.insert(record.order_id.as_str());
            acc.monetary += record.price;
            acc.last_purchase = acc.last_purchase.max(date);
        }

        customers
            .into_iter()
            .map(|(customer_id, acc)| RfmRow {
                customer_id: customer_id.to_string(),
                frequency: acc.order_ids.len(),
                monetary: acc.monetary,
                recency: (anchor - acc.last_purchase).num_days(),
            })
            .collect()
    }

    /// Compute RFM rows anchored at the latest date in `records` itself.
    pub fn create(records: &[OrderLine]) -> Vec<RfmRow> {
        match Self::recency_anchor(records) {
            Some(anchor) => Self::compute(records, anchor),
            None => Vec::new(),
        }
    }

    /// The `n` customers with the largest recency (longest since last purchase).
    pub fn top_by_recency(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
        Self::top_by(rows, n, |a, b| b.recency.cmp(&a.recency))
    }

    /// The `n` customers with the most distinct orders.
    pub fn top_by_frequency(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
        Self::top_by(rows, n, |a, b| b.frequency.cmp(&a.frequency))
    }

    /// The `n` customers with the highest spend.
    pub fn top_by_monetary(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
        Self::top_by(rows, n, |a, b| b.monetary.total_cmp(&a.monetary))
    }

    fn top_by(
        rows: &[RfmRow],
        n: usize,
        cmp: impl FnMut(&RfmRow, &RfmRow) -> std::cmp::Ordering,
    ) -> Vec<RfmRow> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(cmp);
        sorted.truncate(n);
        sorted
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
